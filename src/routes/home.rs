use axum::response::Html;

/// Routes advertised on the landing page.
const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("POST", "/upload", "Upload drawings (multipart <code>files</code>, optional <code>projectId</code>)"),
    ("GET", "/files", "List drawings, optionally <code>?projectId=</code>"),
    ("GET", "/files/{id}", "One drawing's metadata"),
    ("GET", "/files/{id}/content", "Download the stored bytes"),
    ("DELETE", "/files/{id}", "Delete a drawing and its metadata"),
    ("GET", "/uploads/{id}", "Static access to stored files"),
    ("POST", "/projects", "Create a project"),
    ("GET", "/projects", "List projects (<code>?page=&limit=</code>)"),
    ("GET", "/projects/{id}", "One project"),
    ("PUT", "/projects/{id}", "Update a project"),
    ("DELETE", "/projects/{id}", "Delete a project (files are kept)"),
    ("POST", "/jobs", "Submit drawings for processing"),
    ("GET", "/jobs", "List jobs (<code>?status=pending|processing|completed</code>)"),
    ("GET", "/jobs/{id}", "Poll one job"),
];

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page listing the API", content_type = "text/html")
    ),
    tag = "General"
)]
pub async fn root() -> Html<String> {
    let rows: String = ENDPOINTS
        .iter()
        .map(|(method, path, about)| {
            format!(
                "<tr><td class=\"m\">{}</td><td><code>{}</code></td><td>{}</td></tr>\n",
                method, path, about
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Drawing Vault</title>
    <style>
        body {{ font-family: Arial, sans-serif; background-color: #f0f0f0; margin: 0; padding: 40px; color: #333; }}
        main {{ max-width: 820px; margin: 0 auto; }}
        p {{ color: #666; }}
        table {{ border-collapse: collapse; width: 100%; background: white; }}
        td {{ padding: 6px 10px; border-bottom: 1px solid #e3e3e3; }}
        td.m {{ font-weight: bold; width: 70px; }}
        a.docs {{ display: inline-block; margin-top: 20px; padding: 10px 20px; background-color: #007bff; color: white; text-decoration: none; border-radius: 5px; font-weight: bold; }}
    </style>
</head>
<body>
<main>
    <h1>Drawing Vault</h1>
    <p>Upload, review and process engineering drawings. Version {version}.</p>
    <table>
{rows}    </table>
    <a class="docs" href="/swagger-ui/">Explore API Docs</a>
</main>
</body>
</html>
"#,
        version = env!("CARGO_PKG_VERSION"),
        rows = rows,
    ))
}
