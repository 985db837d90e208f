use std::process::Command;

fn main() {
    // Only rebuild CSS when template or CSS files change
    println!("cargo:rerun-if-changed=assets/css/input.css");
    println!("cargo:rerun-if-changed=templates/");

    // Try to run Tailwind CSS standalone CLI
    let status = Command::new("tailwindcss")
        .args([
            "-i",
            "assets/css/input.css",
            "-o",
            "assets/css/output.css",
            "--minify",
        ])
        .status();

    match status {
        Ok(s) if s.success() => {
            println!("cargo:warning=Tailwind CSS compiled successfully");
        }
        _ => {
            // Tailwind CLI not available — create a minimal fallback CSS
            println!("cargo:warning=Tailwind CLI not found, using fallback CSS");
            let fallback = r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; color: #1c1917; background: #fafaf9; -webkit-font-smoothing: antialiased; }
a { color: inherit; text-decoration: none; }
a:hover { opacity: 0.8; }
.container { max-width: 56rem; margin-left: auto; margin-right: auto; padding-left: 1rem; padding-right: 1rem; }
.site-header { background: #fff; border-bottom: 1px solid #e7e5e4; }
.header-inner { display: flex; align-items: center; justify-content: space-between; padding-top: 0.75rem; padding-bottom: 0.75rem; }
.header-nav { display: flex; align-items: center; gap: 0.75rem; }
.brand { font-weight: 700; font-size: 1.25rem; }
.inline-form { display: inline; }
.btn { display: inline-flex; align-items: center; justify-content: center; padding: 0.5rem 1rem; border-radius: 0.5rem; font-size: 0.875rem; font-weight: 500; transition: all 0.15s; cursor: pointer; text-decoration: none; }
.btn-primary { background: #1c1917; color: #fff; border: none; }
.btn-primary:hover { background: #44403c; }
.btn-secondary { background: #fff; color: #1c1917; border: 1px solid #d6d3d1; }
.btn-secondary:hover { background: #f5f5f4; }
.btn-danger { background: #fff; color: #b91c1c; border: 1px solid #fca5a5; }
.btn-danger:hover { background: #fef2f2; }
.btn-link { background: none; border: none; color: #57534e; font-size: 0.875rem; cursor: pointer; text-decoration: underline; }
.card { background: #fff; border-radius: 0.75rem; border: 1px solid #e7e5e4; padding: 1.5rem; box-shadow: 0 1px 2px 0 rgb(0 0 0 / 0.05); }
.muted { color: #78716c; font-size: 0.875rem; }
.page-title { font-size: 1.5rem; font-weight: 700; margin-bottom: 1rem; }
.hero { text-align: center; padding: 2rem 0; }
.hero p { color: #57534e; }
.post-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); gap: 1rem; margin-top: 1rem; }
.post-card h2 { font-size: 1.125rem; margin: 0.5rem 0 0.25rem; }
.post-image { width: 100%; border-radius: 0.5rem; object-fit: cover; max-height: 12rem; }
.tag-row { display: flex; flex-wrap: wrap; gap: 0.25rem; margin: 0.5rem 0; }
.tag { background: #f5f5f4; border: 1px solid #e7e5e4; border-radius: 9999px; padding: 0.125rem 0.625rem; font-size: 0.75rem; color: #57534e; }
.badge { display: inline-block; border-radius: 0.25rem; padding: 0.125rem 0.5rem; font-size: 0.75rem; font-weight: 600; }
.badge-sold { background: #fee2e2; color: #b91c1c; }
.search-row { display: flex; gap: 0.5rem; margin-bottom: 0.75rem; }
.search-row input[type=text] { flex: 1; }
.filter-row { display: flex; flex-wrap: wrap; align-items: center; gap: 1rem; }
.pagination { display: flex; justify-content: center; gap: 1rem; margin: 1.5rem 0; }
input[type=text], input[type=password], input[type=email], select, textarea { padding: 0.5rem 0.75rem; border: 1px solid #d6d3d1; border-radius: 0.5rem; font: inherit; background: #fff; }
textarea { width: 100%; min-height: 5rem; }
.form-row { margin-bottom: 1rem; display: flex; flex-direction: column; gap: 0.25rem; }
.form-row label { font-size: 0.875rem; font-weight: 500; }
.form-error { color: #b91c1c; font-size: 0.875rem; margin: 0.5rem 0; }
.form-hint { color: #a8a29e; font-size: 0.75rem; }
.checkbox-row { display: flex; align-items: center; gap: 0.5rem; }
.auth-page { min-height: 100vh; display: flex; align-items: center; justify-content: center; padding: 1rem; }
.auth-card { width: 100%; max-width: 28rem; }
.auth-card h1 { text-align: center; margin-bottom: 1rem; }
.comment { border-top: 1px solid #f5f5f4; padding: 0.75rem 0; }
.comment-meta { color: #78716c; font-size: 0.8125rem; margin-bottom: 0.25rem; }
.comment-replies { margin-left: 1.5rem; border-left: 2px solid #e7e5e4; padding-left: 1rem; }
.comment-box { margin: 1rem 0; }
.error-page { text-align: center; padding: 4rem 1rem; }
main.container { padding-top: 1.5rem; padding-bottom: 3rem; }
section + section { margin-top: 2rem; }
details summary { cursor: pointer; color: #57534e; font-size: 0.875rem; }
"#;
            std::fs::create_dir_all("assets/css").ok();
            std::fs::write("assets/css/output.css", fallback).ok();
        }
    }
}
