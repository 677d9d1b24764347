//! Default config document written on first run

/// Permission bits for the directory holding the config file
#[cfg(unix)]
pub const CONFIG_DIR_MODE: u32 = 0o700;

/// Permission bits for the config file itself (it carries a secret)
#[cfg(unix)]
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Exact content of a freshly bootstrapped config file
pub const DEFAULT_CONFIG_YAML: &str = r#"# ASK Terminal AI Configuration

# API service configuration
base_url: "https://api.openai.com/v1/"  # API base URL for your provider
api_key: "your-api-key"                 # Your API key (will be encrypted after first run)
model_name: "gpt-4o-mini"               # Default AI model to use

# Feature configuration
private_mode: false                     # Set to true to not send directory structure
sys_prompt: ""                          # System prompt, WARNING: Please understand what you're modifying before making changes

# Provider configuration (currently only openai-compatible is supported)
provider: "openai-compatible"           # AI provider type, no other options available yet
"#;
