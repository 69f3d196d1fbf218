//! Console Adapter
//!
//! Terminal implementation of the RenderSink port.

mod sink;

pub use sink::{format_header, format_row, ConsoleSink, OutputMode};
