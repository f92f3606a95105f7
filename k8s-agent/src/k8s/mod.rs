mod client;
mod pods;

pub use client::kube_client;
pub use pods::collect_images;
