use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::quiz::content::ContentStore;
use crate::quiz::flow::Outcome;
use crate::quiz::scoring::Remark;
use crate::quiz::{ContentItem, Response};
use crate::web::names;

const STYLE: &str = "body{margin:0;font-family:Arial,sans-serif;background:#eef1f4}\
.container{width:65%;margin:40px auto;background:#fff;padding:40px;border-radius:12px;\
box-shadow:0 10px 25px rgba(0,0,0,.25)}\
select,button{width:70%;padding:12px;margin:10px 0;font-size:16px}\
button{background:#2c3e50;color:#fff;border:none;cursor:pointer}\
.error{color:#a94442}";

pub fn page(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                div class="container" { (content) }
            }
        }
    }
}

pub fn selection_page(content: &ContentStore, error: Option<&str>) -> Markup {
    // "</" would close the script element early
    let mapping = content.index_json().replace("</", "<\\/");

    page(
        "AI Study Quiz",
        html! {
            h1 { "AI Study Model" }
            p { "Select a subject and topic" }
            @if let Some(error) = error {
                p class="error" { (error) }
            }
            form method="post" action=(names::START_URL) {
                select id="subject" name="subject" required {
                    option value="" { "-- Select Subject --" }
                    @for subject in content.subjects() {
                        option value=(subject) { (subject) }
                    }
                }
                select id="topic" name="topic" required {
                    option value="" { "-- Select Topic --" }
                }
                button type="submit" { "Begin Quiz" }
            }
            script {
                (PreEscaped(format!(
                    "const mapping = {mapping};\
                     const subjectSel = document.getElementById('subject');\
                     const topicSel = document.getElementById('topic');\
                     subjectSel.addEventListener('change', function () {{\
                       topicSel.innerHTML = \"<option value=''>-- Select Topic --</option>\";\
                       (mapping[this.value] || []).forEach(function (t) {{\
                         const o = document.createElement('option');\
                         o.value = t; o.textContent = t; topicSel.appendChild(o);\
                       }});\
                     }});"
                )))
            }
        },
    )
}

fn response_label(response: Response) -> &'static str {
    match response {
        Response::Strong => "Strong understanding",
        Response::Partial => "Partial understanding",
        Response::Weak => "Need revision",
    }
}

pub fn quiz_page(questions: &[ContentItem]) -> Markup {
    page(
        "Quiz",
        html! {
            h2 { "Quiz" }
            @if questions.is_empty() {
                p { "There are no questions for this topic yet." }
            }
            form method="post" action=(names::QUIZ_URL) {
                @for (i, question) in questions.iter().enumerate() {
                    p { b { "Q" (i + 1) "." } " " (question.text) }
                    @for (j, response) in Response::ALL.into_iter().enumerate() {
                        label {
                            input type="radio" name={ "q" (i) } value=(response.as_str()) required[j == 0];
                            (response_label(response))
                        }
                        br;
                    }
                    br;
                }
                button type="submit" { "Submit Quiz" }
            }
        },
    )
}

pub fn remark_text(remark: Remark, topic: &str) -> String {
    match remark {
        Remark::Excellent => format!("Excellent! You have a strong command of {}.", topic),
        Remark::Good => format!(
            "Good work. Your responses show solid engagement with {}; revisiting tricky concepts will improve mastery.",
            topic
        ),
        Remark::NeedsImprovement => format!(
            "Needs improvement. Spend some more time revising {} before moving on.",
            topic
        ),
    }
}

pub fn remarks_page(outcome: &Outcome) -> Markup {
    page(
        "Performance Remarks",
        html! {
            h2 { "Performance Remarks" }
            p { b { "Score:" } " " (outcome.score) " / " (outcome.total) " (" (outcome.percent) "%)" }
            p { (remark_text(outcome.remark, &outcome.topic)) }
            a href=(names::FOCUS_URL) { button { "Next" } }
        },
    )
}

pub fn focus_page(outcome: &Outcome) -> Markup {
    page(
        "Key Focus Areas",
        html! {
            h2 { "Key Focus Areas" }
            ul {
                li { "Conceptual clarity in " (outcome.topic) }
                li { "Terminology accuracy" }
                li { "Applied understanding" }
                li { "Connections within " (outcome.subject) }
            }
            a href=(names::REPORT_URL) { button { "Final Report" } }
        },
    )
}

pub fn report_page(outcome: &Outcome) -> Markup {
    page(
        "Final Learning Report",
        html! {
            h2 { "Final Learning Report" }
            p { b { "Subject:" } " " (outcome.subject) }
            p { b { "Topic:" } " " (outcome.topic) }
            p { b { "Final Score:" } " " (outcome.score) " / " (outcome.total) }
            p { b { "Remark:" } " " (remark_text(outcome.remark, &outcome.topic)) }
            p { b { "Status:" } " Quiz Completed" }
            hr;
            p { i { "Consistent practice transforms understanding into mastery." } }
            a href=(names::START_URL) { button { "Start Another Quiz" } }
        },
    )
}
