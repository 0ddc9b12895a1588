//! Flight delay prediction form.
//!
//! The form is rendered on the server: a submission renders either the error or the result,
//! while the loading state lives in the browser until the response arrives.

use maud::{html, Markup, DOCTYPE};
use poem::handler;
use poem::web::{Data, Form, Html};

use self::models::{PredictionForm, PredictionRequest, PredictionResponse, AIRPORTS, CARRIERS};
use crate::prelude::*;
use crate::upstream;
use crate::web::partials::headers;
use crate::web::state::State;

pub mod models;

const PREDICT_LABEL: &str = "Predict Delay";
const LOADING_LABEL: &str = "Predicting...";
const FAILURE_MESSAGE: &str = "Failed to get prediction. Please try again.";

/// Mutually exclusive form states, the loading one aside.
enum Outcome {
    Idle,
    Error(String),
    Prediction(PredictionResponse),
}

#[handler]
#[instrument(skip_all, level = "info")]
pub async fn get_form() -> Html<String> {
    Html(render(&PredictionForm::default(), &Outcome::Idle).into_string())
}

#[handler]
#[instrument(skip_all, level = "info")]
pub async fn post_form(
    Form(form): Form<PredictionForm>,
    Data(state): Data<&State>,
) -> Html<String> {
    let outcome = match form.validate() {
        Ok(request) => match request_prediction(&state.upstream, &request).await {
            Ok(prediction) => Outcome::Prediction(prediction),
            Err(error) => {
                error!("failed to get a prediction: {:#}", error);
                Outcome::Error(FAILURE_MESSAGE.to_string())
            }
        },
        Err(error) => {
            info!("invalid form: {:#}", error);
            Outcome::Error(format!("{:#}", error))
        }
    };
    Html(render(&form, &outcome).into_string())
}

/// Issues exactly one prediction service call.
///
/// Unlike the proxy route, a non-successful status is an error here.
async fn request_prediction(
    upstream: &upstream::Client,
    request: &PredictionRequest<'_>,
) -> Result<PredictionResponse> {
    let body = serde_json::value::to_raw_value(request)?;
    let reply = upstream.predict(&body).await?;
    ensure!(reply.status.is_success(), "the prediction service responded with {}", reply.status);
    serde_json::from_slice(&reply.body).context("failed to parse the prediction")
}

fn render(form: &PredictionForm, outcome: &Outcome) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                (headers())
                title { "Flight Delay Predictor" }
            }
            body {
                section.section {
                    div.container {
                        div.columns.is-centered {
                            div.column."is-4-widescreen"."is-6-tablet" {
                                div.box {
                                    h2.title.has-text-centered { "Flight Delay Predictor" }
                                    p.subtitle."is-6".has-text-centered {
                                        "Enter your flight details to predict potential delays"
                                    }
                                    (render_form(form))
                                    @match outcome {
                                        Outcome::Idle => {}
                                        Outcome::Error(message) => { (render_error(message)) }
                                        Outcome::Prediction(prediction) => {
                                            (render_prediction(prediction))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_form(form: &PredictionForm) -> Markup {
    // Disables the button until the next page arrives.
    let on_submit = format!(
        "const button = this.querySelector('button[type=submit]'); button.disabled = true; button.textContent = '{}';",
        LOADING_LABEL,
    );
    html! {
        form method="POST" action="/" onsubmit=(on_submit) {
            div.field {
                label.label for="date" { "Date" }
                input.input id="date" type="date" name="date" value=(form.date) required;
            }
            div.field {
                label.label for="time" { "Time" }
                input.input id="time" type="time" name="time" value=(form.time) required;
            }
            (render_select("carrier", "Airline", "Select an airline", CARRIERS.iter(), &form.carrier))
            (render_select("origin", "Origin Airport", "Select origin airport", AIRPORTS.iter(), &form.origin))
            (render_select(
                "destination",
                "Destination Airport",
                "Select destination airport",
                AIRPORTS.iter(),
                &form.destination,
            ))
            div.field {
                label.label for="num_flights" { "Number of Flights" }
                input.input id="num_flights"
                    type="number"
                    name="num_flights"
                    value=(form.num_flights)
                    placeholder="Number of Flights"
                    min="1"
                    required;
            }
            div.field {
                label.label for="weather_delays" { "Weather-related Delays" }
                input.input id="weather_delays"
                    type="number"
                    name="weather_delays"
                    value=(form.weather_delays)
                    placeholder="Weather-related Delays"
                    min="0"
                    required;
            }
            div.field {
                button.button.is-link.is-fullwidth type="submit" { (PREDICT_LABEL) }
            }
        }
    }
}

fn render_select<'a>(
    name: &str,
    label: &str,
    placeholder: &str,
    options: impl Iterator<Item = &'a &'static str>,
    selected: &str,
) -> Markup {
    html! {
        div.field {
            label.label for=(name) { (label) }
            div.select.is-fullwidth {
                select id=(name) name=(name) required {
                    option value="" { (placeholder) }
                    @for option in options {
                        option value=(option) selected[*option == selected] { (option) }
                    }
                }
            }
        }
    }
}

fn render_error(message: &str) -> Markup {
    html! {
        article.message.is-danger."mt-4" {
            div.message-header { p { "Error" } }
            div.message-body { p { (message) } }
        }
    }
}

fn render_prediction(prediction: &PredictionResponse) -> Markup {
    html! {
        article.message.is-success."mt-4" {
            div.message-header { p { "Prediction Results" } }
            div.message-body {
                p {
                    "Regression Prediction: "
                    strong { (format!("{:.2}", prediction.regression_prediction)) " minutes" }
                }
                p {
                    "Classification Prediction: "
                    strong { (prediction.classification_prediction) }
                }
                p {
                    "Gradient Boosting Prediction: "
                    strong { (format!("{:.2}", prediction.gradient_boosting_prediction)) " minutes" }
                }
                @if let Some(cluster) = &prediction.cluster {
                    p { "Cluster: " strong { (cluster.to_string()) } }
                }
                @if let Some(interpretation) = &prediction.cluster_interpretation {
                    p { "Cluster Interpretation: " strong { (interpretation) } }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use poem::endpoint::make_sync;
    use poem::http::StatusCode;
    use poem::{handler, post, Route};

    use super::*;
    use crate::web::test::{
        create_test_client, spawn_stub_upstream, unreachable_base_url, upstream_opts,
    };

    const FORM: [(&str, &str); 7] = [
        ("date", "2024-01-01"),
        ("time", "08:00"),
        ("carrier", "AA"),
        ("origin", "ATL"),
        ("destination", "LAX"),
        ("num_flights", "3"),
        ("weather_delays", "1"),
    ];

    #[handler]
    async fn prediction() -> &'static str {
        r#"{"regression_prediction":12.5,"classification_prediction":"Short Delay","gradient_boosting_prediction":10.1,"cluster":"C4","cluster_interpretation":"Evening rush"}"#
    }

    async fn submit(
        client: &poem::test::TestClient<impl poem::Endpoint>,
        form: &[(&str, &str)],
    ) -> Result<String> {
        let response = client.post("/").form(&form).send().await;
        response.assert_status_is_ok();
        Ok(response.0.into_body().into_string().await?)
    }

    #[tokio::test]
    async fn get_form_ok() -> Result {
        let client = create_test_client(upstream_opts(&unreachable_base_url()?))?;
        let response = client.get("/").send().await;
        response.assert_status_is_ok();
        let page = response.0.into_body().into_string().await?;
        assert!(page.contains(PREDICT_LABEL));
        assert!(page.contains(r#"<option value="9E">9E</option>"#));
        assert!(page.contains(r#"<option value="TPA">TPA</option>"#));
        assert!(!page.contains("Prediction Results"));
        assert!(!page.contains(FAILURE_MESSAGE));
        Ok(())
    }

    #[tokio::test]
    async fn post_form_renders_prediction_ok() -> Result {
        let base_url = spawn_stub_upstream(Route::new().at("/predict", post(prediction))).await?;
        let client = create_test_client(upstream_opts(&base_url))?;

        let page = submit(&client, &FORM).await?;
        assert!(page.contains("12.50 minutes"));
        assert!(page.contains("Short Delay"));
        assert!(page.contains("10.10 minutes"));
        assert!(page.contains("Cluster: <strong>C4</strong>"));
        assert!(page.contains("Evening rush"));
        assert!(!page.contains(FAILURE_MESSAGE));

        // The submitted values are kept.
        assert!(page.contains(r#"<option value="LAX" selected>LAX</option>"#));
        Ok(())
    }

    #[tokio::test]
    async fn post_form_upstream_unreachable_ok() -> Result {
        let client = create_test_client(upstream_opts(&unreachable_base_url()?))?;
        let page = submit(&client, &FORM).await?;
        assert!(page.contains(FAILURE_MESSAGE));
        assert!(!page.contains("Prediction Results"));
        Ok(())
    }

    #[tokio::test]
    async fn post_form_upstream_error_status_ok() -> Result {
        let base_url = spawn_stub_upstream(Route::new().at(
            "/predict",
            post(make_sync(|_| StatusCode::SERVICE_UNAVAILABLE)),
        ))
        .await?;
        let client = create_test_client(upstream_opts(&base_url))?;
        let page = submit(&client, &FORM).await?;
        assert!(page.contains(FAILURE_MESSAGE));
        Ok(())
    }

    #[tokio::test]
    async fn post_form_invalid_carrier_skips_upstream_ok() -> Result {
        // Any upstream call would fail with the generic message instead.
        let client = create_test_client(upstream_opts(&unreachable_base_url()?))?;
        let mut form = FORM;
        form[2] = ("carrier", "ZZ");
        let page = submit(&client, &form).await?;
        assert!(page.contains("unknown airline `ZZ`"));
        assert!(!page.contains(FAILURE_MESSAGE));
        Ok(())
    }
}
