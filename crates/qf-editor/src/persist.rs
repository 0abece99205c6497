//! Load and save flows between a designer session and a `FormStore`.

use crate::session::{DesignerSession, SessionConfig};
use crate::store::{FormStore, StoreError};
use qf_core::{BridgeError, deserialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored form `{form_id}` is malformed: {source}")]
    Malformed {
        form_id: String,
        #[source]
        source: BridgeError,
    },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch a form and open it in a new session.
pub async fn load_session<S: FormStore>(
    store: &S,
    form_id: &str,
    config: SessionConfig,
) -> Result<DesignerSession, LoadError> {
    let stored = store.load(form_id).await?;
    let document = deserialize(&stored.content).map_err(|source| LoadError::Malformed {
        form_id: form_id.to_string(),
        source,
    })?;
    log::info!(
        "loaded form {form_id} at revision {} ({} elements)",
        stored.revision,
        document.node_count()
    );

    let mut session = DesignerSession::from_document(document, config);
    session.set_theme(stored.theme);
    session.mark_saved(stored.revision);
    Ok(session)
}

/// Save the session's current document. The document is serialized before
/// the first await point; the session's revision advances on success.
pub async fn save_session<S: FormStore>(
    store: &S,
    form_id: &str,
    session: &mut DesignerSession,
) -> Result<u64, SaveError> {
    let request = session.save_request();
    match store.save(form_id, request).await {
        Ok(revision) => {
            log::info!("saved form {form_id} as revision {revision}");
            session.mark_saved(revision);
            Ok(revision)
        }
        Err(err @ StoreError::Conflict { .. }) => {
            log::warn!("save of form {form_id} rejected: {err}");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
