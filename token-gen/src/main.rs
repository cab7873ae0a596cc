use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use uuid::Uuid;

/// Mint a development access token (HS256) for the course plan API.
///
/// Login and password checks live outside the API; this tool stands in for
/// them locally:
/// - Payload: {"user": {"id": <user-id>}, "iat", "exp" (optional), "jti"}
/// - Signed with the same shared secret the server reads from JWT_SECRET
/// - Send the output in the `x-auth-token` header
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Principal id placed in `user.id` (becomes the plan ownerID)
    #[arg(long)]
    user_id: String,

    /// Shared HS256 secret. Defaults to $JWT_SECRET.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,

    /// Token lifetime in seconds. 0 = no `exp` claim.
    #[arg(long, default_value_t = 3600)]
    ttl_seconds: u64,

    /// Override iat (unix seconds). Default: now.
    #[arg(long)]
    iat: Option<u64>,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn now_unix() -> Result<u64, std::time::SystemTimeError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.user_id.trim().is_empty() {
        return Err("--user-id must not be empty".into());
    }
    if args.secret.is_empty() {
        return Err("secret must not be empty".into());
    }

    let iat = match args.iat {
        Some(iat) => iat,
        None => now_unix()?,
    };
    let exp = (args.ttl_seconds > 0).then(|| iat + args.ttl_seconds);
    let jti = Uuid::new_v4().to_string();

    let mut claims = serde_json::Map::new();
    claims.insert(
        "user".to_string(),
        serde_json::json!({ "id": args.user_id.trim() }),
    );
    claims.insert("iat".to_string(), serde_json::Value::Number(iat.into()));
    claims.insert("jti".to_string(), serde_json::Value::String(jti.clone()));
    if let Some(exp) = exp {
        claims.insert("exp".to_string(), serde_json::Value::Number(exp.into()));
    }

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    let token = jsonwebtoken::encode(
        &header,
        &serde_json::Value::Object(claims),
        &EncodingKey::from_secret(args.secret.as_bytes()),
    )?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    println!("x-auth-token: {}", token);
    println!("user.id: {}", args.user_id.trim());
    println!("iat: {}", iat);
    match exp {
        Some(exp) => println!("exp: {}", exp),
        None => println!("exp: (none)"),
    }
    println!("jti: {}", jti);

    Ok(())
}
