use std::future::Future;

use clinicase_core::{CaseId, NewCase, PatientCase};

use crate::error::ClientError;

/// The six remote actions the workbench depends on.
///
/// [`ApiClient`](crate::ApiClient) talks to the real backend; tests swap in
/// an in-memory double. Implementations must be shareable across tasks so
/// several calls can be outstanding at once.
pub trait CaseRepository: Send + Sync {
    fn create_case(
        &self,
        case: &NewCase,
    ) -> impl Future<Output = Result<PatientCase, ClientError>> + Send;

    /// All cases in backend order (creation ascending for the reference backend).
    fn list_cases(&self) -> impl Future<Output = Result<Vec<PatientCase>, ClientError>> + Send;

    fn get_case(
        &self,
        id: &CaseId,
    ) -> impl Future<Output = Result<PatientCase, ClientError>> + Send;

    /// Full replacement of the editable fields.
    fn update_case(
        &self,
        id: &CaseId,
        case: &NewCase,
    ) -> impl Future<Output = Result<PatientCase, ClientError>> + Send;

    /// Ask the backend to (re)generate the summary. Returns the whole case.
    fn summarize_case(
        &self,
        id: &CaseId,
    ) -> impl Future<Output = Result<PatientCase, ClientError>> + Send;

    fn delete_case(&self, id: &CaseId) -> impl Future<Output = Result<(), ClientError>> + Send;
}
