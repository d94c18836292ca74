use serde::{Deserialize, Serialize};

/// Normalized account role. Raw input tolerates two legacy encodings
/// (`1`/`"admin"` and `2`/`"customer"`); nothing downstream ever sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Column encoding: 1 = admin, 2 = customer.
    pub fn as_i16(self) -> i16 {
        match self {
            Role::Admin => 1,
            Role::Customer => 2,
        }
    }

    pub fn from_i16(raw: i16) -> Role {
        if raw == 1 {
            Role::Admin
        } else {
            Role::Customer
        }
    }
}

/// Role as it arrives in a request body: a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRole {
    Num(i64),
    Text(String),
}

impl RawRole {
    /// Boundary normalization; `None` means the value is not a known role.
    pub fn normalize(&self) -> Option<Role> {
        match self {
            RawRole::Num(1) => Some(Role::Admin),
            RawRole::Num(2) => Some(Role::Customer),
            RawRole::Num(_) => None,
            RawRole::Text(s) => {
                let s = s.trim();
                if s == "1" || s.eq_ignore_ascii_case("admin") {
                    Some(Role::Admin)
                } else if s == "2" || s.eq_ignore_ascii_case("customer") {
                    Some(Role::Customer)
                } else {
                    None
                }
            }
        }
    }
}
