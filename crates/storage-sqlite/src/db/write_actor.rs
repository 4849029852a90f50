//! Single-writer actor. Every mutation runs on one dedicated connection inside
//! a `BEGIN IMMEDIATE` transaction, and the caller resumes only after commit.

use diesel::{Connection, SqliteConnection};
use log::error;
use tokio::sync::{mpsc, oneshot};

use fitlog_core::errors::{DatabaseError, Error, Result};

use super::DbPool;
use crate::errors::StorageError;

type Job = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::UnboundedSender<Job>,
}

enum TxError {
    Job(Error),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        TxError::Diesel(err)
    }
}

fn writer_stopped() -> Error {
    Error::Database(DatabaseError::Internal(
        "Database writer is not running".to_string(),
    ))
}

impl WriteHandle {
    /// Runs `job` in its own immediate transaction. An `Err` from the job
    /// rolls the transaction back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (ret_tx, ret_rx) = oneshot::channel();
        let wrapped: Job = Box::new(move |conn: &mut SqliteConnection| {
            let result = conn
                .immediate_transaction::<T, TxError, _>(|tx_conn| {
                    job(tx_conn).map_err(TxError::Job)
                })
                .map_err(|e| match e {
                    TxError::Job(err) => err,
                    TxError::Diesel(err) => Error::from(StorageError::from(err)),
                });
            let _ = ret_tx.send(result);
        });

        self.tx.send(wrapped).map_err(|_| writer_stopped())?;
        ret_rx.await.map_err(|_| writer_stopped())?
    }
}

pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

    let spawned = std::thread::Builder::new()
        .name("fitlog-db-writer".to_string())
        .spawn(move || {
            let mut conn = match pool.get() {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Database writer could not acquire a connection: {}", e);
                    return;
                }
            };
            while let Some(job) = rx.blocking_recv() {
                job(&mut *conn);
            }
        });
    if let Err(e) = spawned {
        error!("Failed to spawn database writer thread: {}", e);
    }

    WriteHandle { tx }
}
