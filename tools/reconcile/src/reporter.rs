//! Reconcile report output: one line per row, then totals.

use campus_store::usecase::reconcile::{ReconcileReport, RowOutcome, RowReport};

pub fn row_line(row: &RowReport) -> String {
    let subject = format!("{} {} -> {}", row.order_id, row.email, row.course_id);
    match &row.outcome {
        RowOutcome::Enrolled {
            user_id,
            payment_id,
        } => format!("ENROLLED  {subject} (user {user_id}, payment {payment_id})"),
        RowOutcome::WouldEnroll { user_id } => format!("WOULD     {subject} (user {user_id})"),
        RowOutcome::Skipped(reason) => format!("SKIPPED   {subject}: {reason}"),
        RowOutcome::Failed(error) => format!("FAILED    {subject}: {error}"),
    }
}

pub fn summary_line(report: &ReconcileReport, dry_run: bool) -> String {
    let enrolled = if dry_run { "would enroll" } else { "enrolled" };
    format!(
        "Results: {} {enrolled}, {} skipped, {} failed",
        report.enrolled(),
        report.skipped(),
        report.failed()
    )
}

pub fn print(report: &ReconcileReport, dry_run: bool) {
    for row in &report.rows {
        println!("{}", row_line(row));
    }
    println!();
    println!("────────────────────────────────────────────────────");
    println!("{}", summary_line(report, dry_run));
}
