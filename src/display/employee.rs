//! Employee display formatting

use crate::models::Employee;

use super::column_width;

pub fn format_employee_list(employees: &[Employee]) -> String {
    if employees.is_empty() {
        return "No employees found.\n".to_string();
    }

    let name_width = column_width("Name", employees.iter().map(|e| e.name.as_str()));

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>14}  {:<12}  {}\n",
        "Name", "Salary (month)", "Last paid", "ID",
    ));
    output.push_str(&"-".repeat(name_width + 46));
    output.push('\n');

    for employee in employees {
        let last_paid = employee
            .last_payment_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:<name_width$}  {:>14}  {:<12}  {}\n",
            employee.name,
            employee.salary_paid_this_month.to_string(),
            last_paid,
            employee.id,
        ));
    }

    output
}
