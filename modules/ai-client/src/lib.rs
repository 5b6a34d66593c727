pub mod claude;
pub mod error;
pub mod openai;
pub mod traits;
pub mod util;

pub use claude::Claude;
pub use error::AiError;
pub use openai::{GeneratedImage, OpenAi};
pub use traits::EmbedAgent;
pub use util::{cosine_similarity, strip_code_blocks, truncate_to_char_boundary};
