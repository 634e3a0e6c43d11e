use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text-backed enums: stored as their lowercase name, parsed
/// case-insensitively from client input.
macro_rules! text_enum {
    ($name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}", $label)),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

text_enum!(Gender, "gender" {
    Male => "male",
    Female => "female",
    Other => "other",
});

text_enum!(UserRole, "role" {
    User => "user",
    Admin => "admin",
});

text_enum!(StaffRole, "role" {
    Stylist => "stylist",
    Barber => "barber",
    SpaTherapist => "spa_therapist",
});

text_enum!(BookingStatus, "status" {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Canceled => "canceled",
});

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Canceled)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub gender: Option<Gender>,
    pub picture: Option<String>,
    pub role: UserRole,
    pub created_at: String,
}

impl User {
    pub const COLUMNS: &'static str =
        "id, name, username, email, password_hash, gender, picture, role, created_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            username: row.get(2)?,
            email: row.get(3)?,
            password_hash: row.get(4)?,
            gender: row.get(5)?,
            picture: row.get(6)?,
            role: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub picture: Option<String>,
    pub price: f64,
    /// Hours.
    pub time_taken: f64,
}

impl Service {
    pub const COLUMNS: &'static str = "id, name, picture, price, time_taken";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            picture: row.get(2)?,
            price: row.get(3)?,
            time_taken: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub picture: Option<String>,
    pub gender: Option<Gender>,
    pub role: StaffRole,
}

impl Staff {
    pub const COLUMNS: &'static str = "id, name, picture, gender, role";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            picture: row.get(2)?,
            gender: row.get(3)?,
            role: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffService {
    pub staff_id: String,
    pub service_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub staff_id: String,
    pub client_id: String,
    pub rating: f64,
    pub review: Option<String>,
}

impl Review {
    pub const COLUMNS: &'static str = "id, staff_id, client_id, rating, review";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            staff_id: row.get(1)?,
            client_id: row.get(2)?,
            rating: row.get(3)?,
            review: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub service_id: String,
    pub staff_id: String,
    pub client_id: Option<String>,
    pub client_name: String,
    pub amount_paid: f64,
    pub time_taken: f64,
    pub booking_time: String,
    pub completed_at: Option<String>,
}

impl Transaction {
    pub const COLUMNS: &'static str = "id, service_id, staff_id, client_id, client_name, \
         amount_paid, time_taken, booking_time, completed_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            service_id: row.get(1)?,
            staff_id: row.get(2)?,
            client_id: row.get(3)?,
            client_name: row.get(4)?,
            amount_paid: row.get(5)?,
            time_taken: row.get(6)?,
            booking_time: row.get(7)?,
            completed_at: row.get(8)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    pub user_id: String,
    pub staff_id: String,
    pub booking_time: String,
    pub status: BookingStatus,
    pub created_at: String,
}

impl Booking {
    pub const COLUMNS: &'static str =
        "id, service_id, user_id, staff_id, booking_time, status, created_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            service_id: row.get(1)?,
            user_id: row.get(2)?,
            staff_id: row.get(3)?,
            booking_time: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
