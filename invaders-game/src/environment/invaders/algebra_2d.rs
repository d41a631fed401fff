/// Axis-aligned Bounding Box in play field pixels.
///
/// TOP / LEFT corner of the play field is 0/0; y grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AaBB {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl AaBB {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0);
        Self { left, top, width, height }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn center_x(&self) -> i32 {
        self.left + self.width / 2
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        AaBB {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// Strict overlap test; touching edges do not count
    pub fn overlaps(&self, other: &AaBB) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}
