//! Work roles offered by the professional details step.

/// Value that requires a free-text role.
pub const OTHER_WORK_ROLE: &str = "other";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkRole {
    pub value: &'static str,
    pub label: &'static str,
}

pub const WORK_ROLES: [WorkRole; 19] = [
    role("compliance_officer", "Compliance Officer"),
    role("analyst", "Analyst"),
    role("audit_team_member", "Audit Team Member"),
    role("auditor", "Auditor"),
    role("compliance_analyst", "Compliance Analyst"),
    role("compliance_director", "Compliance Director"),
    role("quality_control_inspector", "Quality Control Inspector"),
    role("quality_manager", "Quality Manager"),
    role("vice_president_compliance", "Vice President Compliance"),
    role("compliance_manager", "Compliance Manager"),
    role("director", "Director"),
    role("management", "Management"),
    role("quality_engineer", "Quality Engineer"),
    role("risk_manager", "Risk Manager"),
    role("student", "Student"),
    role("department_owner", "Department Owner"),
    role("risk_team_member", "Risk Team Member"),
    role("security_operations", "Security Operations"),
    role(OTHER_WORK_ROLE, "Other"),
];

const fn role(value: &'static str, label: &'static str) -> WorkRole {
    WorkRole { value, label }
}

#[must_use]
pub fn find(value: &str) -> Option<WorkRole> {
    WORK_ROLES.iter().copied().find(|role| role.value == value)
}

/// Role sent to the backend: the free text when `other` was chosen.
#[must_use]
pub fn resolve<'a>(work_role: &'a str, other_work_role: &'a str) -> &'a str {
    if work_role == OTHER_WORK_ROLE {
        other_work_role
    } else {
        work_role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_unique_and_end_with_other() {
        let mut values: Vec<&str> = WORK_ROLES.iter().map(|role| role.value).collect();
        assert_eq!(values.last(), Some(&OTHER_WORK_ROLE));
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), WORK_ROLES.len());
    }

    #[test]
    fn find_and_resolve() {
        assert_eq!(find("auditor").map(|role| role.label), Some("Auditor"));
        assert_eq!(find("ceo"), None);
        assert_eq!(resolve("auditor", "ignored"), "auditor");
        assert_eq!(resolve("other", "Data Steward"), "Data Steward");
    }
}
