use std::path::Path;

use anyhow::Result;

/// Five sales from five countries, with headers and names in the sellers'
/// languages. Every sales field except `country` has a matching column.
pub const DEMO_CSV: &str = "\
cliente,producto,cantidad,precio_unitario,fecha_venta,vendedor
María García,Laptop Dell,2,899.99,2024-01-15,Carlos
Jean Dubois,Ordinateur HP,1,1200.50,2024-01-16,Pierre
Hans Mueller,Computer Lenovo,3,750.00,2024-01-17,Klaus
Giovanni Rossi,Notebook Asus,1,680.00,2024-01-18,Marco
António Silva,Computador Apple,2,1500.00,2024-01-19,João
";

pub const DEMO_FILE_NAME: &str = "demo_sales.csv";

pub fn write_demo(path: &Path) -> Result<()> {
    harmonize_ingest::write_atomic(path, DEMO_CSV.as_bytes())
}
