// Prompt templates for the two generation calls.
// Both receive the stored résumé and the job description verbatim.

const PREAMBLE: &str = "I will provide you with resume and job description.";

/// Prompt asking for a résumé rewritten to fit the job description.
pub fn tailored_resume(resume: &str, job_description: &str) -> String {
    format!(
        "{PREAMBLE} Generate a new resume based on my resume to fit the job description. \
         {resume} {job_description}"
    )
}

/// Prompt asking for a cover letter fitted to the same job description.
pub fn cover_letter(resume: &str, job_description: &str) -> String {
    format!(
        "{PREAMBLE} Generate a new cover letter based on my resume to fit the job description. \
         {resume} {job_description}"
    )
}
