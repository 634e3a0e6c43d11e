//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use angelic::auth::handlers::{register_user, NewUser};
use angelic::auth::Claims;
use angelic::catalog::{ServiceInput, StaffInput};
use angelic::config::Config;
use angelic::db::{
    self,
    models::{Service, Staff, User, UserRole},
};
use angelic::state::AppState;
use tempfile::TempDir;

/// Cheapest cost bcrypt accepts; keeps the suites fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.bcrypt_cost = TEST_BCRYPT_COST;
    config
}

/// Fresh file-backed database with migrations applied. Keep the TempDir
/// alive for as long as the state is used.
pub fn setup() -> (TempDir, AppState) {
    let temp_dir = TempDir::new().unwrap();
    let pool = db::create_pool(&temp_dir.path().join("test.db"))
        .expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    (temp_dir, AppState::new(pool, test_config()))
}

pub fn add_service(state: &AppState, name: &str, price: f64) -> Service {
    state
        .catalog
        .create_service(&ServiceInput {
            name: Some(name.into()),
            picture: Some(format!("{}.png", name.to_lowercase())),
            price: Some(price),
            time_taken: Some(1.0),
        })
        .unwrap()
}

pub fn add_staff(state: &AppState, name: &str) -> Staff {
    state
        .catalog
        .create_staff(&StaffInput {
            name: Some(name.into()),
            picture: Some("staff.png".into()),
            gender: Some("female".into()),
            role: Some("stylist".into()),
        })
        .unwrap()
}

pub fn add_user(state: &AppState, username: &str, role: UserRole) -> User {
    let email = format!("{}@example.com", username);
    register_user(
        &state.db,
        &NewUser {
            name: username,
            username,
            email: &email,
            password: "password123",
            picture: None,
            gender: None,
            role,
        },
        TEST_BCRYPT_COST,
    )
    .unwrap()
}

pub fn claims_for(user: &User) -> Claims {
    Claims {
        user_id: user.id.clone(),
        username: user.username.clone(),
        role: user.role,
    }
}

pub fn count(state: &AppState, table: &str) -> i64 {
    state
        .db
        .get()
        .unwrap()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}
