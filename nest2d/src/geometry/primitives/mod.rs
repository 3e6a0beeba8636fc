mod circle;
mod edge;
mod nonsimple_polygon;
mod point;
mod rect;
mod simple_polygon;

pub use point::cross;

#[doc(inline)]
pub use circle::Circle;
#[doc(inline)]
pub use edge::Edge;
#[doc(inline)]
pub use nonsimple_polygon::NSPolygon;
#[doc(inline)]
pub use point::Point;
#[doc(inline)]
pub use rect::Rect;
#[doc(inline)]
pub use simple_polygon::SPolygon;
