use anyhow::Context;
use tutorbot::config::Config;
use tutorbot::create_app_state;
use tutorbot::resources::v1::tutor::handlers::answer;
use tutorbot::resources::v1::tutor::prompt::known_subjects;
use tutorbot::resources::v1::tutor::V1TutorRequest;

use super::serve_cmd::build_runtime;

pub fn subject_help() -> String {
    format!(
        "Subject to ask about ({}; anything else gets a general tutor)",
        known_subjects().join(", ")
    )
}

pub fn execute(
    config: Config,
    student_id: String,
    subject: String,
    level: String,
    question: String,
) -> anyhow::Result<()> {
    let runtime = build_runtime(config.workers)?;

    runtime.block_on(async move {
        let app_state = create_app_state(config)?;
        let request = V1TutorRequest {
            student_id,
            subject,
            level,
            question,
        };

        let response = answer(&app_state, request)
            .await
            .context("Tutor could not answer")?;

        println!("{}", response.answer);
        Ok::<(), anyhow::Error>(())
    })
}
