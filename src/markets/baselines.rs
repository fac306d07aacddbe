// Reference prices for the market widgets
// Author: kelexine (https://github.com/kelexine)

pub struct Baseline {
    pub symbol: &'static str,
    pub name: &'static str,
    pub price: f64,
}

pub struct TrendTemplate {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

pub static STOCKS: &[Baseline] = &[
    Baseline { symbol: "PETR4", name: "Petrobras", price: 38.50 },
    Baseline { symbol: "VALE3", name: "Vale", price: 65.20 },
    Baseline { symbol: "ITUB4", name: "Itaú Unibanco", price: 25.80 },
    Baseline { symbol: "BBDC4", name: "Bradesco", price: 13.45 },
    Baseline { symbol: "ABEV3", name: "Ambev", price: 11.90 },
    Baseline { symbol: "MGLU3", name: "Magazine Luiza", price: 4.25 },
    Baseline { symbol: "WEGE3", name: "WEG", price: 42.30 },
    Baseline { symbol: "RENT3", name: "Localiza", price: 58.70 },
    Baseline { symbol: "LREN3", name: "Lojas Renner", price: 16.85 },
    Baseline { symbol: "JBSS3", name: "JBS", price: 28.90 },
];

pub static CRYPTOS: &[Baseline] = &[
    Baseline { symbol: "BTC", name: "Bitcoin", price: 95000.0 },
    Baseline { symbol: "ETH", name: "Ethereum", price: 3400.0 },
    Baseline { symbol: "BNB", name: "Binance Coin", price: 680.0 },
    Baseline { symbol: "SOL", name: "Solana", price: 180.0 },
    Baseline { symbol: "ADA", name: "Cardano", price: 0.85 },
    Baseline { symbol: "DOT", name: "Polkadot", price: 7.20 },
    Baseline { symbol: "MATIC", name: "Polygon", price: 0.95 },
    Baseline { symbol: "LINK", name: "Chainlink", price: 22.50 },
];

/// Currency pairs; `symbol` is the pair and `price` the reference rate.
pub static CURRENCIES: &[Baseline] = &[
    Baseline { symbol: "USD/BRL", name: "Dólar", price: 5.85 },
    Baseline { symbol: "EUR/BRL", name: "Euro", price: 6.15 },
    Baseline { symbol: "GBP/BRL", name: "Libra", price: 7.25 },
    Baseline { symbol: "JPY/BRL", name: "Iene", price: 0.039 },
    Baseline { symbol: "ARS/BRL", name: "Peso argentino", price: 0.0058 },
];

pub static INDICES: &[Baseline] = &[
    Baseline { symbol: "IBOV", name: "Ibovespa", price: 125000.0 },
    Baseline { symbol: "IFIX", name: "IFIX", price: 3200.0 },
    Baseline { symbol: "SMLL", name: "Small Cap", price: 4100.0 },
    Baseline { symbol: "ICON", name: "ICO2", price: 8500.0 },
];

pub static TRENDS: &[TrendTemplate] = &[
    TrendTemplate { name: "#Bitcoin", category: "Criptomoedas", description: "Discussões sobre o preço do Bitcoin" },
    TrendTemplate { name: "#Bolsonaro", category: "Política", description: "Notícias políticas" },
    TrendTemplate { name: "#Lula", category: "Política", description: "Governo federal" },
    TrendTemplate { name: "#Copa2026", category: "Esportes", description: "Preparativos para a Copa do Mundo" },
    TrendTemplate { name: "#IA", category: "Tecnologia", description: "Inteligência Artificial" },
    TrendTemplate { name: "#Economia", category: "Economia", description: "Situação econômica brasileira" },
    TrendTemplate { name: "#Petrobras", category: "Economia", description: "Ações da Petrobras" },
    TrendTemplate { name: "#BlackFriday", category: "Varejo", description: "Promoções e ofertas" },
    TrendTemplate { name: "#Magalu", category: "Varejo", description: "Magazine Luiza ofertas" },
    TrendTemplate { name: "#Ethereum", category: "Criptomoedas", description: "Ethereum e DeFi" },
    TrendTemplate { name: "#Flamengo", category: "Esportes", description: "Clube de Regatas do Flamengo" },
    TrendTemplate { name: "#Corinthians", category: "Esportes", description: "Sport Club Corinthians" },
    TrendTemplate { name: "#Netflix", category: "Entretenimento", description: "Novos lançamentos" },
    TrendTemplate { name: "#iPhone", category: "Tecnologia", description: "Apple iPhone" },
    TrendTemplate { name: "#Tesla", category: "Tecnologia", description: "Tesla e carros elétricos" },
];
