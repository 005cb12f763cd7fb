//! Roster users.
//!
//! A user is either an employer (owning a roster of employees) or an
//! employee (with attendance and black points). The balance lives on the
//! user record but is only ever written by the ledger.

use serde::{Deserialize, Serialize};

use crate::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMark {
    Present,
    Absent,
}

impl AttendanceMark {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

/// Employee-only state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub manager_id: UserId,
    /// Attendance percentage, `0..=100`.
    pub attendance: u8,
    pub black_points: u32,
    /// Last mark recorded by the manager during this session.
    #[serde(default)]
    pub last_attendance: Option<AttendanceMark>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Employer { employees: Vec<UserId> },
    Employee(EmployeeRecord),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    /// Non-negative balance in credits.
    pub balance: i64,
    #[serde(flatten)]
    pub role: Role,
}

impl User {
    pub fn is_employer(&self) -> bool {
        matches!(self.role, Role::Employer { .. })
    }

    pub fn employee(&self) -> Option<&EmployeeRecord> {
        match &self.role {
            Role::Employee(record) => Some(record),
            Role::Employer { .. } => None,
        }
    }

    pub(crate) fn employee_mut(&mut self) -> Option<&mut EmployeeRecord> {
        match &mut self.role {
            Role::Employee(record) => Some(record),
            Role::Employer { .. } => None,
        }
    }

    /// Black points used by the policy engine. Employers carry none.
    pub fn black_points(&self) -> u32 {
        self.employee().map_or(0, |e| e.black_points)
    }

    /// Employees on this user's roster (empty for employees).
    pub fn roster(&self) -> &[UserId] {
        match &self.role {
            Role::Employer { employees } => employees,
            Role::Employee(_) => &[],
        }
    }
}
