//! Labor record display formatting

use crate::models::LaborRecord;

pub fn format_labor_list(records: &[LaborRecord]) -> String {
    if records.is_empty() {
        return "No labor records found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:14} {:>12} {:>12} {:>12}  {}\n",
        "Worked", "Employee", "Paid", "Agreed", "Remaining", "Project"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for record in records {
        let worked = record
            .date_worked
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let agreed = record.agreed_wage.map(|m| m.to_string()).unwrap_or_default();
        let remaining = record.remaining_wage.map(|m| m.to_string()).unwrap_or_default();
        let project = record
            .project_id
            .map(|p| p.to_string())
            .unwrap_or_else(|| "(company)".to_string());

        output.push_str(&format!(
            "{:12} {:14} {:>12} {:>12} {:>12}  {}\n",
            worked,
            record.employee_id.to_string(),
            record.paid_amount.to_string(),
            agreed,
            remaining,
            project,
        ));
    }

    output
}
