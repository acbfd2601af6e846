use rocket::response::content::RawHtml;

static STATUS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>StudyHive Server</title>
    <style>
        body {
            margin: 0;
            font-family: Arial, sans-serif;
            background: linear-gradient(135deg, #0a9396, #94d2bd);
            color: #fefae0;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
        }
        .container {
            text-align: center;
        }
        .status {
            margin-top: 20px;
            padding: 10px 20px;
            border-radius: 5px;
            background-color: #e9d8a6;
            color: #005f73;
            font-weight: bold;
            display: inline-block;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>StudyHive Server</h1>
        <p>Your server is up and running!</p>
        <div class="status">Server is Running</div>
    </div>
</body>
</html>
"#;

/// Static status page confirming the server is up.
#[get("/")]
pub fn status_page() -> RawHtml<&'static str> {
    RawHtml(STATUS_PAGE)
}

#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;

    #[rocket::async_test]
    async fn status_page_reports_running() {
        let rocket = rocket::build().mount("/", rocket::routes![super::status_page]);
        let client = Client::tracked(rocket).await.expect("valid rocket");

        let response = client.get("/").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::HTML));

        let body = response.into_string().await.expect("a response body");
        assert!(body.contains("Server is Running"));
    }
}
