pub fn render_password_reset(reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Reset your password</h2>
    <p>Someone asked to reset the password on your GamersClub account.</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #6d28d9; color: white; text-decoration: none; border-radius: 4px;">Choose a new password</a></p>
    <p style="color: #666; font-size: 14px;">The link is valid for one hour. Ignore this email if it wasn't you.</p>
</body>
</html>"#
    )
}
