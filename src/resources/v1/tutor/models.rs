use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct V1TutorRequest {
    pub student_id: String,
    /// e.g. math, science, coding
    pub subject: String,
    /// e.g. beginner, intermediate, advanced
    pub level: String,
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct V1TutorResponse {
    pub student_id: String,
    pub subject: String,
    pub level: String,
    pub question: String,
    pub answer: String,
}

impl V1TutorResponse {
    pub fn answering(request: V1TutorRequest, answer: String) -> Self {
        Self {
            student_id: request.student_id,
            subject: request.subject,
            level: request.level,
            question: request.question,
            answer,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct V1AppInfo {
    pub title: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct V1Health {
    pub status: String,
    pub version: String,
}
