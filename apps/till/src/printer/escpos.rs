//! ESC/POS rendering
//!
//! A small command builder plus the layouts for KOTs, running-order
//! reports and bills. Layout lives here; the receipt models in
//! `rasoi-core` only carry the numbers.

use chrono::NaiveDateTime;

use rasoi_core::receipt::{BillReceipt, KotKind, KotReport, KotTicket, Receipt};
use rasoi_core::{GstRate, Money};

/// Characters per line on 80mm paper.
pub const DEFAULT_WIDTH: usize = 48;

/// ESC/POS command builder.
///
/// Common widths:
/// - 58mm paper: 32 characters
/// - 80mm paper: 48 characters
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(2048);
        // ESC @ - initialize
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self { buf, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    // === Text Output ===

    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// ESC d n - print and feed n lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Alignment ===

    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    // === Text Style ===

    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    pub fn double_height(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x01]);
        self
    }

    pub fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x00]);
        self
    }

    // === Separators ===

    pub fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    // === Layout Helpers ===

    /// Left text left-aligned, right text right-aligned, spaces between.
    pub fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        let lw = left.chars().count();
        let rw = right.chars().count();

        if lw + rw >= self.width {
            self.text(left);
            self.text(" ");
            self.line(right)
        } else {
            let spaces = self.width - lw - rw;
            self.text(left);
            self.text(&" ".repeat(spaces));
            self.line(right)
        }
    }

    /// Item row: name, then rate / qty / amount in fixed right columns.
    /// Names are cut to fit.
    pub fn item_row(&mut self, name: &str, rate: &str, qty: &str, amount: &str) -> &mut Self {
        let numbers = format!("{:>9}{:>5}{:>10}", rate, qty, amount);
        let name_width = self.width.saturating_sub(numbers.chars().count() + 1);
        let name: String = name.chars().take(name_width).collect();
        let padded = format!("{:<width$} ", name, width = name_width);
        self.text(&padded);
        self.line(&numbers)
    }

    /// Name and quantity only, as the kitchen sees it.
    pub fn qty_row(&mut self, name: &str, qty: &str) -> &mut Self {
        let name_width = self.width.saturating_sub(6);
        let name: String = name.chars().take(name_width).collect();
        self.line_lr(&name, qty)
    }

    // === Paper Control ===

    /// GS V 66 n - feed n lines then full cut
    pub fn cut_feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x42, lines]);
        self
    }

    pub fn build_raw(self) -> Vec<u8> {
        self.buf
    }
}

// =============================================================================
// Layouts
// =============================================================================

/// `210.00`, the way amounts read on paper.
pub fn amount(money: Money) -> String {
    let paise = money.paise();
    let sign = if paise < 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, (paise / 100).abs(), (paise % 100).abs())
}

fn half_rate(rate: GstRate) -> GstRate {
    GstRate::from_bps(rate.bps() / 2)
}

/// Renders any receipt to ESC/POS bytes.
pub fn render(receipt: &Receipt, width: usize) -> Vec<u8> {
    let mut p = EscPosBuilder::new(width);
    match receipt {
        Receipt::Kot(ticket) => render_kot(&mut p, ticket),
        Receipt::KotReport(report) => render_kot_report(&mut p, report),
        Receipt::Bill(bill) => render_bill(&mut p, bill),
    }
    p.cut_feed(6);
    p.build_raw()
}

fn render_kot(p: &mut EscPosBuilder, ticket: &KotTicket) {
    let at: NaiveDateTime = ticket.printed_at;

    p.center().bold();
    match ticket.kind {
        KotKind::Regular => p.line("KOT"),
        KotKind::Void => p.line("VOID KOT"),
    };
    p.bold_off().left();

    p.line_lr(
        &format!("KOT No: {}", ticket.kot_no),
        &at.format("%d-%m-%Y").to_string(),
    );
    p.line_lr(
        &format!("Table #: {}", ticket.table_no),
        &at.format("%I:%M:%S %p").to_string(),
    );
    if ticket.kind == KotKind::Regular {
        let captain: String = ticket.captain.chars().take(10).collect();
        p.line(&format!("Cap: {}", captain));
    }

    p.newline();
    p.line_lr("Item Name", "Qty");
    p.sep_single();

    if ticket.kind == KotKind::Regular {
        p.double_height().bold();
    }
    for line in &ticket.lines {
        p.qty_row(&line.item_name, &line.quantity.to_string());
    }
    p.reset_size().bold_off();
}

fn render_kot_report(p: &mut EscPosBuilder, report: &KotReport) {
    p.center().bold().line("Report").bold_off().left();
    p.line_lr(
        &format!("Table #: {}", report.table_no),
        &report.date.format("%d-%m-%Y").to_string(),
    );
    p.line(&format!("KOT No: {}", report.kot_no));
    p.newline();
    p.item_row("Item Name", "Rate", "Qty", "Amt");
    p.sep_single();
    for line in &report.lines {
        p.item_row(
            &line.item_name,
            &amount(line.rate),
            &line.quantity.to_string(),
            &amount(line.total),
        );
    }
    p.sep_single();
    p.bold().line_lr("Total (Rs)", &amount(report.total)).bold_off();
}

fn render_bill(p: &mut EscPosBuilder, bill: &BillReceipt) {
    let header = &bill.header;
    p.center().bold().line(&header.store_name).bold_off();
    if !header.address.is_empty() {
        p.line(&header.address);
    }
    if bill.duplicate {
        p.bold().line("DUPLICATE").bold_off();
    }
    p.left();

    let date = bill.bill_date.format("%d-%m-%Y").to_string();
    let time = bill.bill_time.format("%I:%M %p").to_string();
    let discount = bill.breakdown.discount_percent.value();

    if let Some(food) = &bill.food {
        p.line_lr(
            &format!("GSTIN: {}", header.gstin),
            &format!("HSN Code: {}", header.hsn_code),
        );
        p.line_lr(&format!("Bill #: {}", bill.bill_id), &format!("Date:{}", date));
        p.line_lr(&format!("Table #: {}", bill.table_no), &format!("Time:{}", time));
        p.center().bold().line("Food Bill").bold_off().left();
        p.sep_single();
        p.item_row("Item Name", "Rate", "Qty", "Amt");
        p.sep_single();
        for line in &food.lines {
            p.item_row(
                &line.item_name,
                &amount(line.rate),
                &line.quantity.to_string(),
                &amount(line.total),
            );
        }
        p.sep_single();
        p.line_lr("Sub Total", &amount(food.sub_total));
        if bill.has_discount() {
            p.line_lr(
                &format!("After {}% Discount", discount),
                &amount(food.after_discount),
            );
        }
        let (cgst_caption, sgst_caption) = match food.gst_rate {
            Some(rate) => (
                format!("C-GST @ {}", half_rate(rate)),
                format!("S-GST @ {}", half_rate(rate)),
            ),
            None => ("C-GST".to_string(), "S-GST".to_string()),
        };
        p.line_lr(&cgst_caption, &amount(food.cgst));
        p.line_lr(&sgst_caption, &amount(food.sgst));
        p.bold().line_lr("Total (Rs)", &amount(food.total)).bold_off();
    }

    if let Some(beverage) = &bill.beverage {
        if bill.food.is_some() {
            p.newline().newline();
        }
        p.line_lr(&format!("Bill #: {}", bill.bill_id), &format!("Date:{}", date));
        p.line_lr(&format!("Table #: {}", bill.table_no), &format!("Time:{}", time));
        p.center().bold().line("Beverage Bill").bold_off().left();
        p.sep_single();
        p.item_row("Item Name", "Rate", "Qty", "Amt");
        p.sep_single();
        for line in &beverage.lines {
            p.item_row(
                &line.item_name,
                &amount(line.rate),
                &line.quantity.to_string(),
                &amount(line.total),
            );
        }
        p.sep_single();
        p.line_lr("Sub Total", &amount(beverage.sub_total));
        if bill.has_discount() {
            p.line_lr(
                &format!("After {}% Discount", discount),
                &amount(beverage.after_discount),
            );
        }
        p.bold()
            .line_lr("Total (Rs)", &amount(beverage.after_discount))
            .bold_off();
    }

    if bill.food.is_some() && bill.beverage.is_some() {
        p.newline();
        p.bold()
            .line_lr("GRAND TOTAL (Rs):", &amount(bill.breakdown.grand_total))
            .bold_off();
    }

    p.newline();
    p.center().line("THANK YOU VISIT AGAIN").left();
}
