use actix_multipart::Multipart;
use actix_web::{App, HttpResponse, HttpServer, http::StatusCode, test, web};
use analysis::services::{
    client::AnalysisClient,
    upload::{PdfUpload, collect_pdfs},
};
use common::error::{AppError, Res};
use uuid::Uuid;

const BOUNDARY: &str = "----tenderboundary";

fn file_part(name: &str, file_name: &str, content_type: &str, body: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n{body}\r\n"
    )
}

fn text_part(name: &str, value: &str) -> String {
    format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
}

fn form(parts: &[String]) -> String {
    format!("{}--{BOUNDARY}--\r\n", parts.concat())
}

async fn echo_names(payload: Multipart) -> Res<HttpResponse> {
    let files = collect_pdfs(payload).await?;
    let names: Vec<String> = files.into_iter().map(|f| f.file_name).collect();
    Ok(HttpResponse::Ok().json(names))
}

async fn post_form(body: String) -> actix_web::dev::ServiceResponse {
    let app = test::init_service(App::new().route("/upload", web::post().to(echo_names))).await;
    let req = test::TestRequest::post()
        .uri("/upload")
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request();
    test::call_service(&app, req).await
}

#[actix_web::test]
async fn pdf_files_are_collected_and_other_fields_ignored() {
    let body = form(&[
        file_part("files", "tender.pdf", "application/pdf", "%PDF-1.7 a"),
        text_part("note", "ignored"),
        file_part("files[]", "annexure.PDF", "application/pdf", "%PDF-1.7 b"),
    ]);
    let res = post_form(body).await;

    assert_eq!(res.status(), StatusCode::OK);
    let names: Vec<String> = test::read_body_json(res).await;
    assert_eq!(names, vec!["tender.pdf", "annexure.PDF"]);
}

#[actix_web::test]
async fn non_pdf_file_is_rejected() {
    let body = form(&[file_part("files", "boq.xlsx", "application/vnd.ms-excel", "x")]);
    let res = post_form(body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn pdf_name_with_a_word_content_type_is_rejected() {
    let body = form(&[file_part("files", "x.pdf", "application/msword", "x")]);
    let res = post_form(body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn sixth_file_is_rejected() {
    let parts: Vec<String> = (0..6)
        .map(|i| file_part("files", &format!("t{i}.pdf"), "application/pdf", "%PDF"))
        .collect();
    let res = post_form(form(&parts)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn form_without_files_is_rejected() {
    let res = post_form(form(&[text_part("note", "no files here")])).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

async fn queue_full() -> HttpResponse {
    HttpResponse::TooManyRequests().finish()
}

async fn accepted() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "queued", "job_id": "job_1" }))
}

fn start_fake_service(full: bool) -> String {
    let server = HttpServer::new(move || {
        let app = App::new();
        if full {
            app.route("/analyze", web::post().to(queue_full))
        } else {
            app.route("/analyze", web::post().to(accepted))
        }
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

fn documents() -> Vec<PdfUpload> {
    vec![PdfUpload {
        file_name: "tender.pdf".to_string(),
        bytes: b"%PDF-1.7".to_vec(),
    }]
}

#[actix_web::test]
async fn full_queue_surfaces_try_again_later() {
    let client = AnalysisClient::new(reqwest::Client::new(), &start_fake_service(true));

    let err = client
        .submit(Uuid::new_v4(), &serde_json::Value::Null, documents())
        .await
        .unwrap_err();

    match err {
        AppError::TooManyRequests(msg) => assert!(msg.contains("try again later")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[actix_web::test]
async fn accepted_submission_returns_the_service_body() {
    let client = AnalysisClient::new(reqwest::Client::new(), &start_fake_service(false));

    let profile = serde_json::json!({ "company_name": "ACME Infra" });
    let body = client.submit(Uuid::new_v4(), &profile, documents()).await.unwrap();

    assert_eq!(body["status"], "queued");
}
