//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pkm_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use pkm_core::{
    open_db_in_memory, Document, DocumentManager, ManagerError, OpContext, SqliteDocumentRepository,
};

fn main() {
    println!("pkm_core ping={}", pkm_core::ping());
    println!("pkm_core version={}", pkm_core::core_version());

    match round_trip() {
        Ok(count) => println!("pkm_core round_trip=ok documents={count}"),
        Err(err) => {
            log::error!("event=smoke module=cli status=error error={err}");
            println!("pkm_core round_trip=error {err}");
            std::process::exit(1);
        }
    }
}

fn round_trip() -> Result<u64, ManagerError> {
    let conn = open_db_in_memory().map_err(pkm_core::RepoError::from)?;
    let mut documents = DocumentManager::new(SqliteDocumentRepository::new(&conn));
    let ctx = OpContext::background();
    documents.add(&ctx, &[Document::new("smoke.md").with_tags(["smoke"])])?;
    documents.count_all(&ctx)
}
