//! Cross-cutting helpers shared by every layer

pub mod shutdown;

pub use shutdown::{listen_for_shutdown_signals, ShutdownCoordinator, ShutdownSignal};
