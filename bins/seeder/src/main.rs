//! Database seeder for Daura development and testing.
//!
//! Seeds demo accounts and prints bearer tokens for exercising the API
//! locally. The waste rate catalog itself is seeded by the initial
//! migration.
//!
//! Usage: cargo run --bin seeder

use uuid::Uuid;

use daura_db::AccountRepository;
use daura_shared::auth::{ROLE_MEMBER, ROLE_OPS};
use daura_shared::jwt::{JwtConfig, JwtService};
use daura_shared::types::AccountId;

/// Demo member account ID (consistent for all seeds)
const DEMO_MEMBER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo operator account ID (consistent for all seeds)
const DEMO_OPS_ID: &str = "00000000-0000-0000-0000-000000000002";

/// Dev tokens expire after one day.
const DEV_TOKEN_EXPIRY_SECS: u64 = 86_400;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = daura_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let accounts = AccountRepository::new(db);

    println!("Seeding demo accounts...");
    seed_account(&accounts, demo_member_id(), "Demo Member").await;
    seed_account(&accounts, demo_ops_id(), "Demo Operator").await;

    println!("Minting dev tokens (valid for 24 hours)...");
    let jwt = dev_jwt_service();
    print_token(&jwt, demo_member_id(), ROLE_MEMBER);
    print_token(&jwt, demo_ops_id(), ROLE_OPS);

    println!("Seeding complete!");
}

fn demo_member_id() -> AccountId {
    AccountId::from_uuid(Uuid::parse_str(DEMO_MEMBER_ID).unwrap())
}

fn demo_ops_id() -> AccountId {
    AccountId::from_uuid(Uuid::parse_str(DEMO_OPS_ID).unwrap())
}

/// Builds a JWT service from the same secret the server reads.
fn dev_jwt_service() -> JwtService {
    let secret =
        std::env::var("DAURA__JWT__SECRET").unwrap_or_else(|_| JwtConfig::default().secret);
    JwtService::new(JwtConfig {
        secret,
        token_expiry_secs: DEV_TOKEN_EXPIRY_SECS,
    })
}

/// Seeds one demo account if it does not already exist.
async fn seed_account(repo: &AccountRepository, id: AccountId, display_name: &str) {
    match repo.find_by_id(id).await {
        Ok(Some(_)) => println!("  Account '{display_name}' already exists, skipping..."),
        Ok(None) => match repo.create(id, display_name).await {
            Ok(account) => println!("  Created account: {display_name} ({})", account.id),
            Err(e) => eprintln!("Failed to insert account '{display_name}': {e}"),
        },
        Err(e) => eprintln!("Failed to look up account '{display_name}': {e}"),
    }
}

/// Mints and prints a bearer token for one demo account.
fn print_token(jwt: &JwtService, id: AccountId, role: &str) {
    match jwt.mint_token(id.into_inner(), role) {
        Ok(token) => println!("  {role} token:\n    {token}"),
        Err(e) => eprintln!("Failed to mint {role} token: {e}"),
    }
}
