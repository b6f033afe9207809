//! Upscaling pipeline stages and the driver that runs them in order.

mod accent;
mod filter;
mod replication;
mod upscale;

pub use accent::{accentuate_columns, accentuate_rows, edge_accents};
pub use filter::{blend, gaussian_blur, gaussian_kernel, kernel_size, rescale_intensity, BorderMode};
pub use replication::{replicate, replicate_columns, replicate_rows};
pub use upscale::{Config, Pipeline};
