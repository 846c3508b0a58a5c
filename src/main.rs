use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use storefront_catalog::config::parse_timeout_ms;
use storefront_catalog::deals::{group_deals, DEALS_PER_BUCKET};
use storefront_catalog::filter::{suggest, SUGGEST_POOL_SIZE};
use storefront_catalog::query_sync::{location, parse_query_string};
use storefront_catalog::render::{format_price, GridCell, GridOptions, ProductCardView, NO_PRICE};
use storefront_catalog::{
    CatalogApi, CatalogConfig, CatalogController, CatalogSession, CommitOutcome, DealType,
    FilterChange, FilterStore, ProductSummary, SortOrder,
};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Browse the storefront catalog from the terminal")]
struct Cli {
    #[arg(long, help = "Backend base URL (overrides STOREFRONT_API_URL)")]
    api_url: Option<String>,

    #[arg(long, help = "Request timeout in milliseconds (overrides STOREFRONT_API_TIMEOUT_MS)")]
    timeout_ms: Option<String>,

    #[arg(long, help = "Bearer token (overrides STOREFRONT_API_TOKEN)")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One page of the product listing
    List(ListArgs),
    /// Product detail with related products
    Product { id: String },
    /// Products on sale, grouped by deal type
    Deals,
    /// Search-box suggestions for a partial term
    Suggest { term: String },
    Categories,
    Brands,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, help = "Listing URL query, e.g. \"category=Phones&sort=newest\"")]
    query: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    brand: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    min_price: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    max_price: Option<i64>,

    #[arg(long, help = "random, newest, price-low, price-high or popular")]
    sort: Option<String>,

    #[arg(long)]
    search: Option<String>,

    #[arg(long, help = "dealOfTheDay, flashSale or limitedOffer")]
    deal_type: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    page: Option<i64>,

    #[arg(long)]
    limit: Option<i64>,
}

fn load_config(cli: &Cli) -> Result<CatalogConfig> {
    let mut config = match &cli.api_url {
        Some(url) => {
            let env_config = CatalogConfig::from_env().context("Failed to read configuration")?;
            CatalogConfig {
                api_base_url: CatalogConfig::new(url)?.api_base_url,
                ..env_config
            }
        }
        None => CatalogConfig::from_env().context("Failed to read configuration")?,
    };
    if let Some(raw) = &cli.timeout_ms {
        config = config.with_timeout(parse_timeout_ms(raw)?);
    }
    if let Some(token) = &cli.token {
        config = config.with_auth_token(token.clone());
    }
    Ok(config)
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Folds the CLI flags over the `--query` baseline, in the order a shopper
/// would click them.
fn filters_from_args(args: &ListArgs) -> Result<FilterStore> {
    let mut store = FilterStore::new();
    if let Some(raw) = &args.query {
        store.replace(storefront_catalog::from_query(&parse_query_string(raw)));
    }
    if let Some(category) = &args.category {
        store.set_category(Some(category.as_str()));
    }
    if let Some(brand) = &args.brand {
        store.set_brand(Some(brand.as_str()));
    }
    if args.min_price.is_some() || args.max_price.is_some() {
        let current = store.state().clone();
        store.set_price_range(
            args.min_price.unwrap_or(current.min_price),
            args.max_price.unwrap_or(current.max_price),
        );
    }
    if let Some(raw) = &args.sort {
        let Some(sort) = SortOrder::parse(raw) else {
            bail!("Unknown sort order '{}'", raw);
        };
        store.set_sort(sort);
    }
    if let Some(search) = &args.search {
        store.set_search(Some(search.as_str()));
    }
    if let Some(raw) = &args.deal_type {
        let Some(deal_type) = DealType::parse(raw) else {
            bail!("Unknown deal type '{}'", raw);
        };
        store.set_deal_type(Some(deal_type));
    }
    if let Some(limit) = args.limit {
        store.set_page_size(limit);
    }
    if let Some(page) = args.page {
        store.set_page(page);
    }
    Ok(store)
}

fn price_of(product: &ProductSummary) -> String {
    product
        .effective_price()
        .map(format_price)
        .unwrap_or_else(|| NO_PRICE.to_string())
}

fn print_card(index: usize, card: &ProductCardView) {
    let mut line = format!("{:>3}. {}", index + 1, card.name);
    if let Some(brand) = &card.brand {
        line.push_str(&format!(" ({})", brand));
    }
    line.push_str(&format!(" | {}", card.display_price));
    if let (Some(original), Some(percent)) = (&card.original_price, card.discount_percent) {
        line.push_str(&format!(" was {} (-{}%)", original, percent));
    }
    line.push_str(&format!(" | ★ {:.1}", card.rating));
    if !card.spec_chips.is_empty() {
        line.push_str(&format!(" | {}", card.spec_chips.join(", ")));
    }
    if let Some(badge) = &card.badge {
        line.push_str(&format!(" [{}]", badge));
    }
    println!("{}", line);
    println!("     {}", card.detail_href);
}

async fn run_list(api: CatalogApi, args: &ListArgs) -> Result<()> {
    let store = filters_from_args(args)?;
    let mut session = CatalogSession::new(CatalogController::new(), Arc::new(api));
    let state = session.dispatch(FilterChange::Navigate(storefront_catalog::to_query(store.state())));

    let pb = spinner("Loading products...")?;
    let outcome = session.settle().await;
    pb.finish_and_clear();

    let controller = session.controller();
    if outcome == Some(CommitOutcome::Failed) {
        if let Some(err) = controller.notice() {
            bail!("{} ({})", err.notice(), err);
        }
    }

    println!("Showing {}", location("/products", &state));
    let grid = controller.grid(&GridOptions {
        show_whatsapp: false,
        ..GridOptions::default()
    });
    if grid.cells.is_empty() {
        println!("No products match these filters.");
        return Ok(());
    }
    for (idx, cell) in grid.cells.iter().enumerate() {
        if let GridCell::Product(card) = cell {
            print_card(idx, card);
        }
    }

    if let (Some(page), Some(pagination)) = (controller.page(), controller.pagination()) {
        println!(
            "\nPage {} of {} ({} products)",
            pagination.current, pagination.page_count, page.total
        );
        let controls: Vec<String> = pagination.controls().iter().map(|c| c.to_string()).collect();
        if !controls.is_empty() {
            println!("  {}", controls.join(" "));
        }
        if let Some(prev) = pagination.previous() {
            let mut prev_state = FilterStore::with_state(state.clone());
            println!("  prev: {}", location("/products", &prev_state.set_page(prev as i64)));
        }
        if let Some(next) = pagination.next() {
            let mut next_state = FilterStore::with_state(state.clone());
            println!("  next: {}", location("/products", &next_state.set_page(next as i64)));
        }
    }
    Ok(())
}

async fn run_product(api: CatalogApi, id: &str) -> Result<()> {
    let pb = spinner("Loading product...")?;
    let product = api
        .get_product(id)
        .await
        .with_context(|| format!("Failed to load product {}", id))?;
    let related = api.get_related_products(&product.summary).await.unwrap_or_else(|e| {
        tracing::warn!("Related products unavailable: {}", e);
        Vec::new()
    });
    pb.finish_and_clear();

    let card = ProductCardView::from_product(&product.summary, 0, &GridOptions::default());
    print_card(0, &card);
    if let Some(description) = &product.description {
        println!("\n{}", description);
    }
    match product.stock_quantity {
        Some(quantity) if product.is_in_stock() => println!("{} ({} available)", product.availability(), quantity),
        _ => println!("{}", product.availability()),
    }
    if let Some(link) = &card.whatsapp_href {
        println!("Buy on WhatsApp: {}", link);
    }
    if !related.is_empty() {
        println!("\nRelated products:");
        for (idx, item) in related.iter().enumerate() {
            println!("  {}. {} | {}", idx + 1, item.name, price_of(item));
        }
    }
    Ok(())
}

async fn run_deals(api: CatalogApi) -> Result<()> {
    let pb = spinner("Loading deals...")?;
    let mut buckets = Vec::new();
    for deal_type in DealType::ALL {
        let mut store = FilterStore::new();
        store.set_deal_type(Some(deal_type));
        store.set_page_size(DEALS_PER_BUCKET as i64);
        let page = api
            .get_products(store.state())
            .await
            .with_context(|| format!("Failed to load {} deals", deal_type.label()))?;
        buckets.extend(group_deals(&page.products, DEALS_PER_BUCKET).into_iter().filter(|b| b.deal_type == deal_type));
    }
    pb.finish_and_clear();

    if buckets.is_empty() {
        println!("No deals running right now.");
    }
    for bucket in buckets {
        println!("{}", bucket.label());
        for product in &bucket.products {
            println!("  - {} | {}", product.name, price_of(product));
        }
    }
    Ok(())
}

async fn run_suggest(api: CatalogApi, term: &str) -> Result<()> {
    let mut store = FilterStore::new();
    store.set_page_size(SUGGEST_POOL_SIZE);
    let pb = spinner("Loading catalog...")?;
    let page = api
        .get_products(store.state())
        .await
        .context("Failed to load products for suggestions")?;
    pb.finish_and_clear();

    let found = suggest(&page.products, term);
    if found.is_empty() {
        println!("No suggestions for '{}'.", term.trim());
    }
    for product in found {
        match &product.brand {
            Some(brand) => println!("  - {} ({}) | {}", product.name, brand, price_of(product)),
            None => println!("  - {} | {}", product.name, price_of(product)),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront_catalog=info,storefront=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let start_time = Instant::now();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::info!("Using catalog API at {}", config.api_base_url);
    let api = CatalogApi::new(config).context("Failed to create API client")?;

    match &cli.command {
        Command::List(args) => run_list(api, args).await?,
        Command::Product { id } => run_product(api, id).await?,
        Command::Deals => run_deals(api).await?,
        Command::Suggest { term } => run_suggest(api, term).await?,
        Command::Categories => {
            let categories = api.get_categories().await.context("Failed to load categories")?;
            println!("{} categories", categories.len());
            for category in categories {
                println!("  - {}", category.name);
            }
        }
        Command::Brands => {
            let brands = api.get_brands().await.context("Failed to load brands")?;
            println!("{} brands", brands.len());
            for brand in brands {
                println!("  - {}", brand.name);
            }
        }
    }

    tracing::debug!("Finished in {:.2} seconds", start_time.elapsed().as_secs_f32());
    Ok(())
}
