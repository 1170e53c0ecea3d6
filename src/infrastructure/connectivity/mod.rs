pub mod http_probe;
pub mod monitor;

pub use http_probe::HttpConnectivityProbe;
pub use monitor::ConnectivityMonitor;
