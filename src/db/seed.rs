use chrono::{Duration, Utc};
use rusqlite::params;

use crate::auth::handlers::{register_user, NewUser};
use crate::config::AdminConfig;
use crate::db::models::{Gender, UserRole};
use crate::db;
use crate::state::DbPool;

/// Create the configured admin account unless an admin already exists.
/// Returns whether an account was created.
pub fn seed_admin(pool: &DbPool, admin: &AdminConfig, bcrypt_cost: u32) -> anyhow::Result<bool> {
    let (Some(username), Some(password)) = (admin.username.as_deref(), admin.password.as_deref())
    else {
        return Ok(false);
    };

    let has_admin: bool = pool.get()?.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE role = 'admin'",
        [],
        |row| row.get(0),
    )?;
    if has_admin {
        return Ok(false);
    }

    let default_email = format!("{}@localhost", username);
    let email = admin.email.as_deref().unwrap_or(&default_email);
    register_user(
        pool,
        &NewUser {
            name: "Administrator",
            username,
            email,
            password,
            picture: None,
            gender: None,
            role: UserRole::Admin,
        },
        bcrypt_cost,
    )?;

    tracing::info!(username = %username, "admin account created");
    Ok(true)
}

/// Load a small demo catalog into an empty database. Does nothing if any
/// staff or services exist already.
pub fn seed_demo(pool: &DbPool, bcrypt_cost: u32) -> anyhow::Result<()> {
    let populated: bool = pool.get()?.query_row(
        "SELECT (SELECT COUNT(*) FROM staff) + (SELECT COUNT(*) FROM services) > 0",
        [],
        |row| row.get(0),
    )?;
    if populated {
        tracing::info!("Demo data skipped: catalog is not empty");
        return Ok(());
    }

    let mut clients = Vec::new();
    for (name, username, gender) in [
        ("Alice Johnson", "alicej", Gender::Female),
        ("Bob Smith", "bobsmith", Gender::Male),
    ] {
        let email = format!("{}@example.com", username);
        let user = register_user(
            pool,
            &NewUser {
                name,
                username,
                email: &email,
                password: "password123",
                picture: None,
                gender: Some(gender),
                role: UserRole::User,
            },
            bcrypt_cost,
        )?;
        clients.push(user);
    }

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let staff: Vec<String> = [
        ("Mike Barber", "male", "barber"),
        ("Lisa Stylist", "female", "stylist"),
        ("John Spa Therapist", "male", "spa_therapist"),
        ("Emma Hairdresser", "female", "stylist"),
    ]
    .into_iter()
    .map(|(name, gender, role)| {
        let id = db::new_id();
        tx.execute(
            "INSERT INTO staff (id, name, gender, role) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, gender, role],
        )
        .map(|_| id)
    })
    .collect::<Result<_, _>>()?;

    let services: Vec<(String, f64, f64)> = [
        ("Men's Haircut", 20.0, 0.5),
        ("Women's Haircut", 30.0, 1.0),
        ("Massage Therapy", 50.0, 1.5),
        ("Braiding", 40.0, 2.0),
    ]
    .into_iter()
    .map(|(name, price, hours)| {
        let id = db::new_id();
        tx.execute(
            "INSERT INTO services (id, name, price, time_taken) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, price, hours],
        )
        .map(|_| (id, price, hours))
    })
    .collect::<Result<_, _>>()?;

    // barber: men's cut; stylists: women's cut and braiding; therapist: massage
    for (staff_idx, service_idx) in [(0, 0), (1, 1), (1, 3), (2, 2), (3, 1), (3, 3)] {
        tx.execute(
            "INSERT INTO staff_services (staff_id, service_id) VALUES (?1, ?2)",
            params![staff[staff_idx], services[service_idx].0],
        )?;
    }

    for (staff_idx, client_idx, rating, text) in [
        (0, 0, 5.0, "Great haircut!"),
        (1, 1, 4.5, "Very professional."),
        (2, 0, 4.0, "Relaxing massage."),
    ] {
        tx.execute(
            "INSERT INTO reviews (id, staff_id, client_id, rating, review) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![db::new_id(), staff[staff_idx], clients[client_idx].id, rating, text],
        )?;
    }

    let now = Utc::now();
    for (staff_idx, service_idx, client_idx, days_ago) in
        [(0, 0, 0, 0), (1, 1, 1, 2), (2, 2, 0, 9), (3, 3, 1, 20)]
    {
        let (service_id, price, hours) = &services[service_idx];
        let client = &clients[client_idx];
        tx.execute(
            "INSERT INTO transactions (id, service_id, staff_id, client_id, client_name,
                                       amount_paid, time_taken, booking_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                db::new_id(),
                service_id,
                staff[staff_idx],
                client.id,
                client.name,
                price,
                hours,
                db::timestamp(now - Duration::days(days_ago))
            ],
        )?;
    }

    tx.commit()?;
    tracing::info!("Demo data loaded");
    Ok(())
}
