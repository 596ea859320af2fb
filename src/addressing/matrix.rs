/// Order in which the physical chain walks the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixOrder {
    /// Every row runs left to right
    #[default]
    RowMajor,
    /// Odd rows run right to left
    Serpentine,
    /// Every column runs top to bottom
    ColumnMajor,
    /// Odd columns run bottom to top
    ColumnSerpentine,
}

/// A `width x height` grid of pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixLayout {
    width: usize,
    height: usize,
    order: MatrixOrder,
    flip_y: bool,
}

impl MatrixLayout {
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            order: MatrixOrder::RowMajor,
            flip_y: false,
        }
    }

    #[must_use]
    pub const fn with_order(mut self, order: MatrixOrder) -> Self {
        self.order = order;
        self
    }

    /// Logical row 0 is the physical bottom row
    #[must_use]
    pub const fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn order(&self) -> MatrixOrder {
        self.order
    }

    pub fn resolve(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let y = if self.flip_y { self.height - 1 - y } else { y };

        Some(match self.order {
            MatrixOrder::RowMajor => y * self.width + x,
            MatrixOrder::Serpentine if y % 2 == 1 => y * self.width + (self.width - 1 - x),
            MatrixOrder::Serpentine => y * self.width + x,
            MatrixOrder::ColumnMajor => x * self.height + y,
            MatrixOrder::ColumnSerpentine if x % 2 == 1 => {
                x * self.height + (self.height - 1 - y)
            }
            MatrixOrder::ColumnSerpentine => x * self.height + y,
        })
    }
}
