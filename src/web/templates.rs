const LOGIN_PAGE_STYLES: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: linear-gradient(135deg, #2d5a27 0%, #1e3d1a 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
        }
        .login-box {
            background: white;
            padding: 2.5rem;
            border-radius: 12px;
            box-shadow: 0 10px 40px rgba(0,0,0,0.3);
            width: 100%;
            max-width: 360px;
        }
        h1 { color: #2d5a27; font-size: 1.4rem; margin-bottom: 0.5rem; text-align: center; }
        .subtitle { color: #7f8c8d; font-size: 0.85rem; text-align: center; margin-bottom: 1.5rem; }
        .form-group { margin-bottom: 1rem; }
        label { display: block; color: #2c3e50; font-size: 0.85rem; margin-bottom: 0.5rem; }
        input[type="password"] {
            width: 100%;
            padding: 0.75rem 1rem;
            border: 2px solid #e0e0e0;
            border-radius: 8px;
            font-size: 1rem;
            transition: border-color 0.2s;
        }
        input[type="password"]:focus { outline: none; border-color: #2d5a27; }
        button {
            width: 100%;
            padding: 0.875rem;
            background: #2d5a27;
            color: white;
            border: none;
            border-radius: 8px;
            font-size: 1rem;
            font-weight: 600;
            cursor: pointer;
            transition: background 0.2s;
        }
        button:hover { background: #1e3d1a; }
        .error { color: #c0392b; font-size: 0.85rem; text-align: center; margin-top: 1rem; display: none; }
        .error.show { display: block; }
"#;

/// The login form; `show_error` flips the wrong-password banner on for the
/// re-rendered page after a failed attempt.
pub fn render_login_page(show_error: bool) -> String {
    let error_class = if show_error { "error show" } else { "error" };

    format!(
        r#"<!DOCTYPE html>
<html lang="de">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Login - Holzeinschlag Österreich</title>
    <style>{LOGIN_PAGE_STYLES}</style>
</head>
<body>
    <div class="login-box">
        <h1>🌲 Holzeinschlag Österreich</h1>
        <p class="subtitle">Bitte Passwort eingeben</p>
        <form method="POST" action="/login">
            <div class="form-group">
                <label for="password">Passwort</label>
                <input type="password" id="password" name="password" required autofocus>
            </div>
            <button type="submit">Anmelden</button>
        </form>
        <p class="{error_class}">Falsches Passwort</p>
    </div>
</body>
</html>"#
    )
}
