pub mod google_maps;
pub mod optimizer;
pub mod retry;
