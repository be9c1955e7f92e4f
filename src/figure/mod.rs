/// Figure layer: a renderer-independent description of the plot, and the
/// static image exporter. The interactive viewer reads the same [`Figure`].
pub mod export;
pub mod model;

pub use export::save_figure;
pub use model::{Figure, LineKind, Panel, Trace, TraceFilter};
