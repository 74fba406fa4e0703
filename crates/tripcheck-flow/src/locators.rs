//! Element locators for the travel-policy purchase wizard.
//!
//! The button class lists are generated by the site's MUI build and change
//! between deployments; everything else keys on visible Hebrew text or on
//! the date inputs' placeholder.

use tripcheck_browser::Locator;

/// "First purchase" button on the landing page
pub const FIRST_PURCHASE_BTN: Locator = Locator::xpath(
    "//button[@class='MuiButtonBase-root MuiButton-root jss34 jss13 MuiButton-contained jss12 MuiButton-containedPrimary']",
);

/// Destination card ("USA")
pub const ANY_CONTINENT_CARD: Locator = Locator::xpath("//div[text()='ארה\"ב']");

/// "Continue" from destinations to dates
pub const TO_DATES_BTN: Locator = Locator::xpath(
    "//button[@class='MuiButtonBase-root MuiButton-root jss208 MuiButton-contained jss164 MuiButton-containedPrimary']",
);

pub const DEPARTURE_DATE_FIELD: Locator =
    Locator::xpath("(//input[@placeholder='dd/mm/yyyy'])[1]");

pub const RETURN_DATE_FIELD: Locator = Locator::xpath("(//input[@placeholder='dd/mm/yyyy'])[2]");

/// Trip-length label, e.g. `סה"כ: 30 ימים`. Matched by prefix so the count is free.
pub const TOTAL_DAYS_TEXT: Locator =
    Locator::xpath("//span[starts-with(normalize-space(.),'סה\"כ')]");

/// "Continue" from dates to passengers
pub const TO_PASSENGERS_BTN: Locator = Locator::xpath(
    "//button[@class='MuiButtonBase-root MuiButton-root jss208 MuiButton-contained MuiButton-containedPrimary']",
);

pub const PASSENGERS_HEADER: Locator =
    Locator::xpath("//h2[text()='נשמח להכיר את הנוסעים שנבטח הפעם']");

/// Every locator the first-purchase flow touches, in flow order.
pub const FIRST_PURCHASE: [Locator; 8] = [
    FIRST_PURCHASE_BTN,
    ANY_CONTINENT_CARD,
    TO_DATES_BTN,
    DEPARTURE_DATE_FIELD,
    RETURN_DATE_FIELD,
    TOTAL_DAYS_TEXT,
    TO_PASSENGERS_BTN,
    PASSENGERS_HEADER,
];
