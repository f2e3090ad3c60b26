pub mod relay_diagnostics;
