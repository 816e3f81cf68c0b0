use anyhow::{bail, Context, Result};

use crate::api::GrievanceApi;
use crate::board::LOAD_FAILED;
use crate::commands::print_notices;
use crate::desk::Desk;
use crate::detail::Draft;
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::Status;
use crate::store::Database;
use crate::workflow::Outcome;

/// Load the stored draft for `id`, or start one from the live complaint.
async fn open_draft<A: GrievanceApi>(desk: &Desk<A>, db: &Database, id: &str) -> Result<Draft> {
    if let Some(draft) = db.get_draft(id)? {
        return Ok(draft);
    }
    desk.refresh().await.context(LOAD_FAILED)?;
    let board = desk.board();
    let complaint = board
        .get(id)
        .ok_or_else(|| WorkflowError::UnknownComplaint(id.to_string()))?;
    Ok(Draft::for_complaint(complaint))
}

async fn stage<A, F>(desk: &Desk<A>, db: &Database, id: &str, edit: F) -> Result<()>
where
    A: GrievanceApi,
    F: FnOnce(&mut Draft, &str) -> WorkflowResult<()>,
{
    let mut draft = open_draft(desk, db, id).await?;
    edit(&mut draft, desk.session().author())?;
    db.save_draft(&draft)?;

    if let Some(entry) = draft.entries.last() {
        println!("Staged on {}: {}", id, entry.message);
    }
    println!(
        "{} uncommitted entr{}; run 'grievance commit {}' to save",
        draft.entries.len(),
        if draft.entries.len() == 1 { "y" } else { "ies" },
        id
    );
    Ok(())
}

pub async fn status<A: GrievanceApi>(
    desk: &Desk<A>,
    db: &Database,
    id: &str,
    status: Status,
    message: Option<&str>,
) -> Result<()> {
    stage(desk, db, id, |draft, author| {
        draft.change_status(status, message, author);
        Ok(())
    })
    .await
}

pub async fn note<A: GrievanceApi>(desk: &Desk<A>, db: &Database, id: &str, text: &str) -> Result<()> {
    stage(desk, db, id, |draft, author| draft.add_update(text, author)).await
}

pub async fn close<A: GrievanceApi>(
    desk: &Desk<A>,
    db: &Database,
    id: &str,
    feedback: Option<&str>,
) -> Result<()> {
    stage(desk, db, id, |draft, author| {
        draft.close(feedback, author);
        Ok(())
    })
    .await
}

/// Print the staged draft for `id` without touching the network.
pub fn show_draft(db: &Database, id: &str) -> Result<()> {
    let draft = match db.get_draft(id)? {
        Some(d) => d,
        None => {
            println!("No draft for {}", id);
            return Ok(());
        }
    };

    println!("Draft for {}", draft.complaint_id);
    if let Some(status) = draft.status {
        println!("New status: {}", status);
    }
    if let Some(feedback) = &draft.feedback {
        println!("Feedback: {}", feedback);
    }
    for entry in &draft.entries {
        println!("  + {} ({})", entry.message, entry.author);
    }
    Ok(())
}

/// List every complaint with a staged draft.
pub fn list_drafts(db: &Database) -> Result<()> {
    let drafts = db.list_drafts()?;
    if drafts.is_empty() {
        println!("No drafts.");
        return Ok(());
    }
    for draft in drafts {
        println!("{:<12} {} entries", draft.complaint_id, draft.entries.len());
    }
    Ok(())
}

pub async fn commit<A: GrievanceApi>(desk: &Desk<A>, db: &Database, id: &str) -> Result<()> {
    let draft = match db.get_draft(id)? {
        Some(d) => d,
        None => bail!("No draft for {}", id),
    };

    desk.refresh().await.context(LOAD_FAILED)?;
    desk.board().select(id)?;

    let result = desk.commit(&draft).await;
    print_notices(desk);
    // the server accepted the draft either way once we get an outcome
    let outcome = result?;
    db.delete_draft(id)?;
    if outcome == Outcome::Superseded {
        println!("Complaint {} changed while saving; run 'grievance show {}'", id, id);
    }
    Ok(())
}

pub fn discard(db: &Database, id: &str) -> Result<()> {
    if db.delete_draft(id)? {
        println!("Discarded draft for {}", id);
    } else {
        println!("No draft for {}", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::testing::{desk, FakeApi};
    use serde_json::json;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    fn officer_desk(api: FakeApi) -> Desk<FakeApi> {
        let session = Session::from_raw(
            Some("tok".to_string()),
            Some(r#"{"role":"officer","name":"Priya Nair"}"#),
        );
        desk(api, session)
    }

    fn listing() -> Vec<serde_json::Value> {
        vec![json!({"_id": "k1", "uniqueID": "GRV-1", "status": "in progress"})]
    }

    // ==================== Unit Tests ====================

    #[tokio::test]
    async fn test_staging_persists_across_calls() {
        let (db, _dir) = setup_test_db();
        let desk = officer_desk(FakeApi::with_listing(listing()));

        status(&desk, &db, "GRV-1", Status::Resolved, Some("pipe replaced"))
            .await
            .unwrap();
        note(&desk, &db, "GRV-1", "Citizen informed").await.unwrap();

        let draft = db.get_draft("GRV-1").unwrap().unwrap();
        assert_eq!(draft.key, "k1");
        assert_eq!(draft.status, Some(Status::Resolved));
        assert_eq!(draft.entries.len(), 2);
        assert!(draft.entries.iter().all(|e| e.author == "Priya Nair"));
        // the second call reused the stored draft
        assert_eq!(desk.api().scopes().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_note_rejected() {
        let (db, _dir) = setup_test_db();
        let desk = officer_desk(FakeApi::with_listing(listing()));

        assert!(note(&desk, &db, "GRV-1", "   ").await.is_err());
        assert!(db.get_draft("GRV-1").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stage_unknown_complaint() {
        let (db, _dir) = setup_test_db();
        let desk = officer_desk(FakeApi::with_listing(listing()));
        assert!(close(&desk, &db, "GRV-404", None).await.is_err());
    }

    #[tokio::test]
    async fn test_commit_deletes_draft() {
        let (db, _dir) = setup_test_db();
        let desk = officer_desk(FakeApi::with_listing(listing()));
        close(&desk, &db, "GRV-1", Some("All good")).await.unwrap();

        commit(&desk, &db, "GRV-1").await.unwrap();
        assert!(db.get_draft("GRV-1").unwrap().is_none());

        let sent = desk.api().progress();
        assert_eq!(sent[0].0, "k1");
        assert_eq!(sent[0].1.status.as_deref(), Some("closed"));
        assert_eq!(sent[0].1.feedback.as_deref(), Some("All good"));
        assert_eq!(desk.board().get("GRV-1").unwrap().status, Status::Closed);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_draft() {
        let (db, _dir) = setup_test_db();
        let api = FakeApi::with_listing(listing());
        api.fail_progress();
        let desk = officer_desk(api);
        note(&desk, &db, "GRV-1", "Crew dispatched").await.unwrap();

        assert!(commit(&desk, &db, "GRV-1").await.is_err());
        assert!(db.get_draft("GRV-1").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_commit_without_draft() {
        let (db, _dir) = setup_test_db();
        let desk = officer_desk(FakeApi::with_listing(listing()));
        let result = commit(&desk, &db, "GRV-1").await;
        assert!(result.unwrap_err().to_string().contains("No draft"));
    }

    #[test]
    fn test_discard() {
        let (db, _dir) = setup_test_db();
        db.save_draft(&Draft::new("GRV-1", "k1")).unwrap();
        discard(&db, "GRV-1").unwrap();
        assert!(db.get_draft("GRV-1").unwrap().is_none());
        discard(&db, "GRV-1").unwrap();
        assert!(show_draft(&db, "GRV-1").is_ok());
        assert!(list_drafts(&db).is_ok());
    }
}
