use crate::infra::InMemoryLeadGateway;
use clap::Args;
use servisai::config::IntakeTiming;
use servisai::error::AppError;
use servisai::intake::{
    ActivityFeed, CategoryCatalog, CategoryId, DraftUpdate, IntakeService, PriceOffer,
    SessionSnapshot, SubmitOutcome, TracingErrorSink,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Category for the lead (defaults to the first catalog entry)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Problem description typed by the visitor
    #[arg(long, default_value = "Sudužęs telefono ekranas")]
    pub(crate) description: String,
    /// Location code typed by the visitor
    #[arg(long, default_value = "01001")]
    pub(crate) zip_code: String,
    /// Take the lead store offline to show the failure path
    #[arg(long)]
    pub(crate) fail: bool,
}

pub(crate) fn run_catalog() {
    let catalog = CategoryCatalog::standard();
    println!("Service categories");
    for category in catalog.all() {
        let availability = if category.active { "" } else { " (coming soon)" };
        println!("- {} [{}]{}", category.name, category.id, availability);
    }

    println!("\nSample offers");
    for offer in PriceOffer::mock_offers() {
        println!(
            "- {}: {} EUR, rating {:.1} ({} reviews), replies in {}",
            offer.company, offer.price, offer.rating, offer.reviews, offer.response_time
        );
    }

    println!("\nRecent activity");
    for record in ActivityFeed::standard().records() {
        println!("- {} ordered {} for {} EUR", record.user, record.service, record.price);
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        category,
        description,
        zip_code,
        fail,
    } = args;

    let gateway = if fail {
        InMemoryLeadGateway::offline()
    } else {
        InMemoryLeadGateway::default()
    };
    let service = IntakeService::standard(
        Arc::new(gateway.clone()),
        Arc::new(TracingErrorSink),
        IntakeTiming::default(),
    );

    println!("Lead intake demo");
    let session = service.open_session();
    render_snapshot("Opened session", &session.snapshot().await);

    let unavailable = CategoryId::new("construction");
    let changed = session.select_category(&unavailable).await;
    println!("\nBrowse '{unavailable}': {}", if changed { "selected" } else { "ignored" });

    let outcome = session.submit().await;
    println!("Submit with an empty form: {}", describe(&outcome));

    session
        .edit_draft(DraftUpdate {
            category: category.map(CategoryId::new),
            description: Some(description),
            zip_code: Some(zip_code),
        })
        .await;
    render_snapshot("\nAfter editing", &session.snapshot().await);

    let outcome = session.submit().await;
    println!("\nSubmit: {}", describe(&outcome));
    render_snapshot("After submit", &session.snapshot().await);

    let stored = gateway.leads();
    if stored.is_empty() {
        println!("\nStored leads: none");
    } else {
        println!("\nStored leads");
        for row in stored {
            println!(
                "- [{}] {} / {} / {}",
                row.received_at.format("%Y-%m-%d %H:%M:%S"),
                row.lead.category,
                row.lead.description,
                row.lead.zip_code
            );
        }
    }

    service.close_session(session.id()).await;
    Ok(())
}

fn describe(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Ignored(reason) => format!("ignored ({reason})"),
        SubmitOutcome::Succeeded => "stored".to_string(),
        SubmitOutcome::Failed(err) => format!("failed ({err})"),
    }
}

fn render_snapshot(title: &str, snapshot: &SessionSnapshot) {
    println!("{title}");
    println!("- session: {}", snapshot.session_id);
    println!("- browsing: {}", snapshot.selected_category);
    println!(
        "- draft: category={} description='{}' zip='{}' (valid: {})",
        snapshot.draft.category,
        snapshot.draft.description,
        snapshot.draft.zip_code,
        snapshot.draft_valid
    );
    println!(
        "- submission: {}{}",
        snapshot.submission.label(),
        if snapshot.notice_visible {
            ", success notice shown"
        } else {
            ""
        }
    );
    if let Some(activity) = &snapshot.activity {
        println!(
            "- activity: {} ordered {} for {} EUR",
            activity.user, activity.service, activity.price
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_runs_on_both_paths() {
        run_demo(DemoArgs {
            description: "torn jacket".to_string(),
            zip_code: "01001".to_string(),
            ..DemoArgs::default()
        })
        .await
        .expect("demo succeeds");

        run_demo(DemoArgs {
            description: "torn jacket".to_string(),
            zip_code: "01001".to_string(),
            fail: true,
            ..DemoArgs::default()
        })
        .await
        .expect("failure path still completes");
    }
}
