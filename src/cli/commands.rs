use std::fmt::Write as _;
use std::net::SocketAddr;

use chrono::NaiveDate;

use crate::app::{AppContext, Result, WikidashError};
use crate::controller::{DashboardController, SearchStatus};
use crate::domain::language::{find_language, parse_translation_languages};
use crate::domain::AVAILABLE_LANGUAGES;
use crate::notification::NotificationEvent;
use crate::proxy::{self, ProxyState};
use crate::service::translated_text;

/// Applies command-line overrides to a freshly mounted controller.
pub fn select(controller: &mut DashboardController, language: Option<String>, date: Option<NaiveDate>) {
    if let Some(language) = language {
        if find_language(&language).is_none() {
            eprintln!("Note: {} is not one of the dashboard languages", language);
        }
        controller.set_language(language);
    }
    if let Some(date) = date {
        controller.set_date(date);
    }
}

pub async fn fetch_featured(
    ctx: &AppContext,
    language: Option<String>,
    date: Option<NaiveDate>,
    page: usize,
    page_size: Option<usize>,
) -> Result<()> {
    let mut controller = ctx.controller();
    let mut notices = ctx.notifications.subscribe();
    select(&mut controller, language, date);

    if let Some(size) = page_size {
        controller.set_page_size(size);
    }
    controller.set_page(page);

    let status = controller.trigger_search().await;
    let notice = notices.current().cloned();

    match status {
        Some(SearchStatus::Success) => {
            if let Some(notice) = &notice {
                println!("{}", render_notice(notice));
            }
            print!("{}", render_dashboard(&controller));
            Ok(())
        }
        _ => Err(WikidashError::Other(
            notice
                .map(|n| n.message)
                .unwrap_or_else(|| "search did not run".to_string()),
        )),
    }
}

pub fn list_languages() {
    for language in AVAILABLE_LANGUAGES {
        println!("{:<4} {}", language.code, language.label);
    }
}

pub async fn list_remote_languages(ctx: &AppContext) -> Result<()> {
    let (data, status) = ctx.service.fetch_supported_languages().await?;
    if status != 200 {
        return Err(WikidashError::Other(format!(
            "language list request failed with status {}",
            status
        )));
    }

    let languages = parse_translation_languages(&data);
    if languages.is_empty() {
        println!("No languages");
        return Ok(());
    }

    for language in languages {
        println!("{:<6} {}", language.code, language.name);
    }
    Ok(())
}

pub async fn translate(ctx: &AppContext, text: &str, target: &str) -> Result<()> {
    let (data, status) = ctx.service.translate(text, target).await?;
    if status != 200 {
        return Err(WikidashError::Other(format!(
            "translation failed with status {}",
            status
        )));
    }

    match translated_text(&data) {
        Some(translated) => println!("{}", translated),
        None => eprintln!("Translation provider returned no text"),
    }
    Ok(())
}

pub async fn serve(ctx: &AppContext, bind: Option<String>) -> Result<()> {
    let addr: SocketAddr = match bind {
        Some(bind) => bind
            .parse()
            .map_err(|_| WikidashError::Config(format!("invalid bind address: {}", bind)))?,
        None => ctx
            .config
            .proxy
            .bind_addr()
            .map_err(|e| WikidashError::Config(e.to_string()))?,
    };

    let state = ProxyState::new(ctx.service.clone(), ctx.config.proxy.allowed_origins.clone());
    println!("Serving /api/feed on http://{}", addr);
    proxy::serve(addr, state).await
}

pub fn render_notice(event: &NotificationEvent) -> String {
    format!("[{}] {}", event.kind, event.message)
}

/// Text rendering of the committed payload and the current page.
pub fn render_dashboard(controller: &DashboardController) -> String {
    let mut out = String::new();

    let Some(payload) = controller.payload() else {
        out.push_str("No content loaded\n");
        return out;
    };

    if let Some(selection) = controller.payload_selection() {
        let _ = writeln!(out, "Featured content for {} ({})", selection.date, selection.language);
    }

    if let Some(article) = controller.featured_article() {
        let _ = writeln!(out, "\nFeatured article: {}", article.display_title());
        if let Some(extract) = &article.extract {
            let _ = writeln!(out, "  {}", extract);
        }
        if let Some(url) = article.page_url() {
            let _ = writeln!(out, "  {}", url);
        }
    }

    if let Some(image) = controller.featured_image() {
        let _ = writeln!(out, "\nPicture of the day: {}", image.display_title());
        if let Some(description) = image.description_text() {
            let _ = writeln!(out, "  {}", description);
        }
    }

    let pagination = controller.pagination();
    let view = controller.view();
    let start = pagination.bounds(view.count).start;

    let _ = writeln!(
        out,
        "\nMost read (page {}/{}, {} per page, {} total)",
        pagination.page_index(),
        controller.page_count(),
        pagination.page_size(),
        payload.most_read().len()
    );

    if view.articles.is_empty() {
        out.push_str("  No articles on this page\n");
    }

    for (offset, article) in view.articles.iter().enumerate() {
        let read_marker = match &article.tid {
            Some(tid) if controller.is_read(tid) => " ",
            _ => "●",
        };
        let views = article
            .views
            .map(|v| format!("{:>9}", v))
            .unwrap_or_else(|| " ".repeat(9));

        let _ = writeln!(
            out,
            "{} {:>3}. {} {}",
            read_marker,
            start + offset + 1,
            views,
            article.display_title()
        );
    }

    out
}
