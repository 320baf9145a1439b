use axum::{response::Html, routing::get, Router};

const INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Todo</title></head>
<body>
<h1>Welcome</h1>
<p>The todo API is served under <a href="/api/Todo">/api/Todo</a>.</p>
</body>
</html>
"#;

const PRIVACY: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Privacy Policy - Todo</title></head>
<body>
<h1>Privacy Policy</h1>
<p>Todos are stored only in this server's database.</p>
</body>
</html>
"#;

const ERROR: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Error - Todo</title></head>
<body>
<h1 class="text-danger">Error.</h1>
<h2 class="text-danger">An error occurred while processing your request.</h2>
</body>
</html>
"#;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/Home", get(index))
        .route("/Home/Index", get(index))
        .route("/Home/Privacy", get(privacy))
        .route("/Home/Error", get(error))
}

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

async fn privacy() -> Html<&'static str> {
    Html(PRIVACY)
}

async fn error() -> Html<&'static str> {
    Html(ERROR)
}
