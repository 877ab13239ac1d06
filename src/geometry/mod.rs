//! Shapes, masks and clamped bounding boxes.

use ndarray::Array2;

/// A 2-D point in image pixel coordinates, `(row, col)` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub row: f64,
    pub col: f64,
}

impl Point {
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Polygon,
    Ellipse,
    Rectangle,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Polygon => "polygon",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Rectangle => "rectangle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "polygon" => Some(ShapeKind::Polygon),
            "ellipse" => Some(ShapeKind::Ellipse),
            "rectangle" => Some(ShapeKind::Rectangle),
            _ => None,
        }
    }
}

/// A user-drawn shape: a typed vertex list in image pixel coordinates.
///
/// Ellipses and rectangles are described by the corner vertices of their
/// axis-aligned bounding extent, polygons by their outline.
#[derive(Debug, Clone)]
pub struct Shape {
    pub kind: ShapeKind,
    pub vertices: Vec<Point>,
}

impl Shape {
    pub fn new(kind: ShapeKind, vertices: Vec<Point>) -> Self {
        Self { kind, vertices }
    }

    /// Axis-aligned bounding box of the vertex list, unclamped.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::of_vertices(&self.vertices)
    }

    /// Interior test for a pixel coordinate.
    pub fn contains(&self, p: Point) -> bool {
        match self.kind {
            ShapeKind::Rectangle => {
                let b = self.bounding_box();
                p.row >= b.min_row as f64
                    && p.row < b.max_row as f64
                    && p.col >= b.min_col as f64
                    && p.col < b.max_col as f64
            }
            ShapeKind::Ellipse => {
                let b = self.bounding_box();
                let cy = (b.min_row + b.max_row) as f64 / 2.0;
                let cx = (b.min_col + b.max_col) as f64 / 2.0;
                let ry = (b.max_row - b.min_row) as f64 / 2.0;
                let rx = (b.max_col - b.min_col) as f64 / 2.0;
                if ry <= 0.0 || rx <= 0.0 {
                    return false;
                }
                let dy = (p.row - cy) / ry;
                let dx = (p.col - cx) / rx;
                dy * dy + dx * dx <= 1.0
            }
            ShapeKind::Polygon => {
                let vs = &self.vertices;
                if vs.len() < 3 {
                    return false;
                }
                // Ray casting over the vertex outline.
                let mut inside = false;
                let mut j = vs.len() - 1;
                for i in 0..vs.len() {
                    let (vi, vj) = (vs[i], vs[j]);
                    if (vi.row > p.row) != (vj.row > p.row)
                        && p.col
                            < (vj.col - vi.col) * (p.row - vi.row) / (vj.row - vi.row) + vi.col
                    {
                        inside = !inside;
                    }
                    j = i;
                }
                inside
            }
        }
    }

    /// Full-frame interior mask. Only pixels inside the clamped bounding box
    /// are ever tested; everything else stays `false`.
    pub fn to_mask(&self, height: usize, width: usize) -> Array2<bool> {
        let mut mask = Array2::from_elem((height, width), false);
        let b = self.bounding_box().clamp(height, width);
        if b.is_degenerate() {
            return mask;
        }
        for r in b.min_row as usize..b.max_row as usize {
            for c in b.min_col as usize..b.max_col as usize {
                if self.contains(Point::new(r as f64, c as f64)) {
                    mask[[r, c]] = true;
                }
            }
        }
        mask
    }
}

/// Compute full-frame masks for a whole ROI set in one pass.
pub fn to_masks(shapes: &[Shape], height: usize, width: usize) -> Vec<Array2<bool>> {
    shapes.iter().map(|s| s.to_mask(height, width)).collect()
}

/// Half-open axis-aligned bounding box, `[min, max)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_row: i64,
    pub max_row: i64,
    pub min_col: i64,
    pub max_col: i64,
}

impl BoundingBox {
    pub fn of_vertices(vertices: &[Point]) -> Self {
        let mut min_row = f64::INFINITY;
        let mut max_row = f64::NEG_INFINITY;
        let mut min_col = f64::INFINITY;
        let mut max_col = f64::NEG_INFINITY;
        for v in vertices {
            min_row = min_row.min(v.row);
            max_row = max_row.max(v.row);
            min_col = min_col.min(v.col);
            max_col = max_col.max(v.col);
        }
        if vertices.is_empty() {
            return Self {
                min_row: 0,
                max_row: 0,
                min_col: 0,
                max_col: 0,
            };
        }
        Self {
            min_row: min_row.floor() as i64,
            max_row: max_row.ceil() as i64,
            min_col: min_col.floor() as i64,
            max_col: max_col.ceil() as i64,
        }
    }

    /// Clamp each of the four bounds independently to `[0, extent]`.
    ///
    /// A bound falling entirely outside the frame on one side is pinned to
    /// that side's limit, so strongly out-of-frame shapes collapse to an
    /// empty box instead of being rejected here. Callers must check
    /// [`BoundingBox::is_degenerate`] on the result.
    pub fn clamp(&self, height: usize, width: usize) -> Self {
        let h = height as i64;
        let w = width as i64;
        Self {
            min_row: self.min_row.clamp(0, h),
            max_row: self.max_row.clamp(0, h),
            min_col: self.min_col.clamp(0, w),
            max_col: self.max_col.clamp(0, w),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.max_row <= self.min_row || self.max_col <= self.min_col
    }

    pub fn height(&self) -> usize {
        (self.max_row - self.min_row).max(0) as usize
    }

    pub fn width(&self) -> usize {
        (self.max_col - self.min_col).max(0) as usize
    }
}
