pub mod callback;
pub mod memory;
pub mod supabase;
pub mod traits;

pub use callback::session_from_callback;
pub use memory::MemoryGateway;
pub use supabase::SupabaseClient;
pub use traits::{AuthGateway, AuthOutcome, GatewayResult, ProfileGateway, SignUpMetadata};
