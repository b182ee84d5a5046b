use crate::core::models::batch::BatchStatus;

pub fn batches_by_status_key(status: BatchStatus) -> String {
    format!("batches_by_status:{}", status)
}
