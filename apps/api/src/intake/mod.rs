// Input acquisition: typed text arrives with the rank request directly;
// PDFs go through the extract endpoint and supersede typed text client-side.

pub mod handlers;
pub mod pdf;
