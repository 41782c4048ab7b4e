/// Hugging Face utilities
pub mod hugging_face;

/// Renderer Utilities
pub mod renderer;

/// Tensor Utilities
pub mod tensors;
